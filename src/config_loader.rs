// Configuration file support for the description API
//
// Values from an optional flat TOML file seed any environment variables
// that are not already set, so the environment always takes precedence
// and the application defaults apply last.

use std::env;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use toml::Value;

const CONFIG_FILE_PATH: &str = "describe_api.conf";

/// Render a flat TOML value as an env-var string
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        // Arrays and tables have no env-var representation
        _ => None,
    }
}

/// Seed unset environment variables from the optional config file
///
/// Returns true if the config file was successfully loaded, false otherwise
pub fn load_config() -> bool {
    let config_path = Path::new(CONFIG_FILE_PATH);
    if !config_path.exists() {
        debug!("Configuration file not found at: {}", CONFIG_FILE_PATH);
        return false;
    }

    let parsed = fs::read_to_string(config_path)
        .map_err(|e| e.to_string())
        .and_then(|content| content.parse::<Value>().map_err(|e| e.to_string()));

    let table = match parsed {
        Ok(Value::Table(table)) => table,
        Ok(_) => {
            warn!("Configuration file is not a flat TOML table");
            return false;
        }
        Err(e) => {
            warn!("Failed to load configuration file: {}", e);
            return false;
        }
    };

    for (key, value) in &table {
        let Some(value) = value_to_string(value) else {
            warn!("Skipping unsupported TOML value type for key: {}", key);
            continue;
        };
        if env::var(key).is_err() {
            debug!("Setting env var from config file: {}", key);
            env::set_var(key, value);
        } else {
            debug!("Env var already exists, skipping: {}", key);
        }
    }

    info!("Configuration loaded from {}", CONFIG_FILE_PATH);
    true
}
