pub mod server_config;

pub use server_config::{ConfigError, DeploymentEnv, ServerConfig};
