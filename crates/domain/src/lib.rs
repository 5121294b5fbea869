pub mod config;
pub mod error;
pub mod home;
pub mod message;
pub mod trace;
