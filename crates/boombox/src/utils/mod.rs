mod config;
pub mod math;
mod tick;

pub use config::{Config, ConfigError, Settings};
pub use tick::Tick;
