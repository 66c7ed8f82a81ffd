// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are consistent, within valid ranges, and
//! that no two channels point at the same endpoint.

use crate::{ConfigError, ConfigResult, DrivehudConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    EndpointConflict {
        first: String,
        second: String,
        endpoint: String,
    },
    MissingRequired {
        field: String,
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndpointConflict {
                first,
                second,
                endpoint,
            } => write!(
                f,
                "Endpoint conflict: {} and {} both use {}",
                first, second, endpoint
            ),
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Collects every problem before failing so a broken file is fixed in one pass.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &DrivehudConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_endpoints(config, &mut errors);
    validate_timing(config, &mut errors);
    validate_display(config, &mut errors);

    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn validate_endpoints(config: &DrivehudConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.endpoints.vision_socket.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "endpoints.vision_socket".to_string(),
        });
    }

    let endpoints = config.endpoints.all_pubsub();
    for (i, (name, endpoint)) in endpoints.iter().enumerate() {
        if endpoint.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("endpoints.{}", name),
            });
            continue;
        }
        for (other_name, other_endpoint) in endpoints.iter().skip(i + 1) {
            if endpoint == other_endpoint {
                errors.push(ConfigValidationError::EndpointConflict {
                    first: name.to_string(),
                    second: other_name.to_string(),
                    endpoint: endpoint.to_string(),
                });
            }
        }
    }
}

fn validate_timing(config: &DrivehudConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.timing.tick_interval_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "timing.tick_interval_ms".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if config.timing.vision_retry_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "timing.vision_retry_ms".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
}

fn validate_display(config: &DrivehudConfig, errors: &mut Vec<ConfigValidationError>) {
    let smoothing = config.display.light_smoothing;
    if !(smoothing > 0.0 && smoothing <= 1.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "display.light_smoothing".to_string(),
            reason: format!("{} is outside (0, 1]", smoothing),
        });
    }
    if config.display.max_brightness <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "display.max_brightness".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}
