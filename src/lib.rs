pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod inference;
pub mod scanner;
pub mod store;

pub use controller::ScanController;
pub use error::{PneumoScanError, Result};
