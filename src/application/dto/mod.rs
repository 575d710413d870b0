pub mod auth;
pub mod guest;
pub mod logs;
pub mod tags;
