use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use rand::RngCore;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be set in production")]
    Missing { var: &'static str },

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentEnv {
    Development,
    Production,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub jwt_secret: Vec<u8>,
    pub session_cookie_name: String,
    pub default_max_members: u32,
    pub max_mentors_per_project: u32,
    pub max_projects_per_leader: u32,
    pub max_message_length: usize,
    pub connection_buffer: usize,
    pub ping_interval_secs: u64,
    pub environment: DeploymentEnv,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("database_namespace", &self.database_namespace)
            .field("database_name", &self.database_name)
            .field("jwt_secret", &"<redacted>")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("default_max_members", &self.default_max_members)
            .field("max_mentors_per_project", &self.max_mentors_per_project)
            .field("max_projects_per_leader", &self.max_projects_per_leader)
            .field("max_message_length", &self.max_message_length)
            .field("connection_buffer", &self.connection_buffer)
            .field("ping_interval_secs", &self.ping_interval_secs)
            .field("environment", &self.environment)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_url: "mem://".to_string(),
            database_namespace: "teamroom".to_string(),
            database_name: "main".to_string(),
            jwt_secret: random_secret(),
            session_cookie_name: "token".to_string(),
            default_max_members: 8,
            max_mentors_per_project: 2,
            max_projects_per_leader: 6,
            max_message_length: 4000,
            connection_buffer: 100,
            ping_interval_secs: 30,
            environment: DeploymentEnv::Development,
        }
    }
}

impl ServerConfig {
    /// Load from environment variables, falling back to development defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("DEPLOYMENT_ENV").as_deref() {
            Ok("production") => DeploymentEnv::Production,
            Ok("development") | Err(_) => DeploymentEnv::Development,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    var: "DEPLOYMENT_ENV",
                    value: other.to_string(),
                    reason: "expected development or production".to_string(),
                });
            },
        };
        let defaults = Self::default();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ if environment == DeploymentEnv::Production => {
                return Err(ConfigError::Missing { var: "JWT_SECRET" });
            },
            _ => {
                warn!("JWT_SECRET not set, generating random secret (not suitable for production)");
                defaults.jwt_secret
            },
        };

        let config = Self {
            bind_addr: parse_var("TEAMROOM_BIND_ADDR", defaults.bind_addr)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or(defaults.database_namespace),
            database_name: env::var("DATABASE_NAME").unwrap_or(defaults.database_name),
            jwt_secret,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            default_max_members: parse_var("DEFAULT_MAX_MEMBERS", defaults.default_max_members)?,
            max_mentors_per_project: parse_var(
                "MAX_MENTORS_PER_PROJECT",
                defaults.max_mentors_per_project,
            )?,
            max_projects_per_leader: parse_var(
                "MAX_PROJECTS_PER_LEADER",
                defaults.max_projects_per_leader,
            )?,
            max_message_length: parse_var("MAX_MESSAGE_LENGTH", defaults.max_message_length)?,
            connection_buffer: parse_var("CONNECTION_BUFFER", defaults.connection_buffer)?,
            ping_interval_secs: parse_var("PING_INTERVAL_SECS", defaults.ping_interval_secs)?,
            environment,
        };
        config.validate()?;

        info!(
            bind_addr = %config.bind_addr,
            database_url = %config.database_url,
            environment = ?config.environment,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("DEFAULT_MAX_MEMBERS", self.default_max_members as u64),
            ("MAX_PROJECTS_PER_LEADER", self.max_projects_per_leader as u64),
            ("MAX_MESSAGE_LENGTH", self.max_message_length as u64),
            ("CONNECTION_BUFFER", self.connection_buffer as u64),
            ("PING_INTERVAL_SECS", self.ping_interval_secs),
        ];
        for (var, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    value: value.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.environment == DeploymentEnv::Production {
            if self.jwt_secret.len() < 32 {
                return Err(ConfigError::Invalid {
                    var: "JWT_SECRET",
                    value: "<redacted>".to_string(),
                    reason: "must be at least 32 bytes in production".to_string(),
                });
            }
            if self.database_url.starts_with("mem://") {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_URL",
                    value: self.database_url.clone(),
                    reason: "in-memory storage is not durable".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn random_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 64];
    rand::rng().fill_bytes(&mut secret);
    secret
}
