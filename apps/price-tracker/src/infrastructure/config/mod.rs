//! Configuration loading from the environment.

mod settings;

pub use settings::{
    ApiKey, ConfigError, DatabaseSettings, MarketDataSettings, ServerSettings, TrackerConfig,
};
