pub mod resolve;
pub mod types;

pub use resolve::{load_config, ConfigSource, GLOBAL_CONFIG, LOCAL_CONFIG};
pub use types::Config;
