// Configuration module entry point
// Loads the immutable service configuration and the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, GeneratorConfig, LimitsConfig, PerformanceConfig};

/// Password length used when the request does not carry `length`
pub const DEFAULT_LENGTH: u32 = 8;
/// Number of passwords used when the request does not carry `count`
pub const DEFAULT_COUNT: u32 = 1;

/// Generator used when neither the file, the environment nor the CLI name one
pub const DEFAULT_GENERATOR_PATH: &str = "/usr/local/bin/password-generator";

/// Values given on the command line, applied on top of every other source
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub password_generator: Option<String>,
    pub port: Option<u16>,
}

/// Configuration rejected by [`Config::validate`]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("generator path must not be empty")]
    EmptyGeneratorPath,
    #[error("limits.min_{name} ({min}) is greater than limits.max_{name} ({max})")]
    InvertedRange {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("default {name} {default} lies outside limits {min}..={max}")]
    DefaultOutOfRange {
        name: &'static str,
        default: u32,
        min: u32,
        max: u32,
    },
    #[error("unknown access log format '{0}' (expected combined, common or json)")]
    UnknownAccessLogFormat(String),
    #[error(
        "generator.timeout_secs ({generator}) must be shorter than the connection timeout ({connection}s)"
    )]
    GeneratorTimeoutTooLong { generator: u64, connection: u64 },
}

impl Config {
    /// Load configuration from a file path (extension optional, file optional)
    /// layered over built-in defaults and `PASSGEN_*` environment variables
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PASSGEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("generator.path", DEFAULT_GENERATOR_PATH)?
            .set_default("generator.args", Vec::<String>::new())?
            .set_default("generator.timeout_secs", 10)?
            .set_default("limits.min_length", 4)?
            .set_default("limits.max_length", 1024)?
            .set_default("limits.min_count", 1)?
            .set_default("limits.max_count", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "passgen-server")?
            .set_default("http.output_content_type", "text/plain; charset=utf-8")?
            .build()?;

        settings.try_deserialize()
    }

    /// Command-line flags win over file and environment values
    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(ref path) = overrides.password_generator {
            self.generator.path.clone_from(path);
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.generator.path.trim().is_empty() {
            return Err(ConfigValidationError::EmptyGeneratorPath);
        }

        let limits = &self.limits;
        check_range("length", DEFAULT_LENGTH, limits.min_length, limits.max_length)?;
        check_range("count", DEFAULT_COUNT, limits.min_count, limits.max_count)?;

        // A generator timeout must fire while the connection can still carry
        // the error envelope.
        let generator = self.generator.timeout_secs;
        let connection = self.connection_timeout_secs();
        if generator > 0 && generator >= connection {
            return Err(ConfigValidationError::GeneratorTimeoutTooLong {
                generator,
                connection,
            });
        }

        match self.logging.access_log_format.as_str() {
            "combined" | "common" | "json" => Ok(()),
            other => Err(ConfigValidationError::UnknownAccessLogFormat(
                other.to_string(),
            )),
        }
    }

    /// Upper bound on the lifetime of one connection
    pub fn connection_timeout_secs(&self) -> u64 {
        std::cmp::max(self.performance.read_timeout, self.performance.write_timeout)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn check_range(
    name: &'static str,
    default: u32,
    min: u32,
    max: u32,
) -> Result<(), ConfigValidationError> {
    if min > max {
        return Err(ConfigValidationError::InvertedRange { name, min, max });
    }
    if !(min..=max).contains(&default) {
        return Err(ConfigValidationError::DefaultOutOfRange {
            name,
            default,
            min,
            max,
        });
    }
    Ok(())
}
