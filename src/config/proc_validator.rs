//! Configuration validation with aggregated errors.
//! All issues are collected into one Vec<String> so a broken config file
//! is reported in a single pass.

use tracing::{error, info};

use crate::config::settings::{LoggingConfig, ServiceConfig, SettingsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_SAFETY_MARGIN_SECONDS: u64 = 3600;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(root_dir) = &settings.root_dir {
        if root_dir.trim().is_empty() {
            errors.push("settings.root_dir must not be empty".to_string());
        }
    }

    if let Some(margin) = settings.safety_margin_seconds {
        if margin > MAX_SAFETY_MARGIN_SECONDS {
            errors.push(format!(
                "settings.safety_margin_seconds must be <= {}, got {}",
                MAX_SAFETY_MARGIN_SECONDS, margin
            ));
        }
    }

    if let Some(logging) = &settings.logging {
        validate_logging(logging, errors);
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' is not one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}
