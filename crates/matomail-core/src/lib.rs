pub mod config;
pub mod engine;
pub mod error;
pub mod mask;
pub mod render;
pub mod runner;
pub mod source;

pub use error::{Error, Result};
