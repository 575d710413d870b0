pub mod create_log;
pub mod delete_log;
pub mod get_log;
pub mod list_logs;
pub mod update_log;
