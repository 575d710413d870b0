pub mod health_probe;
pub mod log_repository;
pub mod user_repository;
