pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod helpers;
pub mod models;
pub mod services;

pub use error::{Error, Result};
