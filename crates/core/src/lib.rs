pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::AppConfig;
pub use error::{AdsheetError, AdsheetResult};
