pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod event_handler;
pub mod secrets;
pub mod users;

pub use config::Config;
pub use error::Error;
