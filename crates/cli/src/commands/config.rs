use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clientele_core::config::{DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE};
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 12] = [
        ("database.url", config.database.url.clone(), &[]),
        ("database.max_connections", config.database.max_connections.to_string(), &[]),
        ("database.timeout_secs", config.database.timeout_secs.to_string(), &[]),
        ("storage.backend", format!("{:?}", config.storage.backend), &[]),
        ("server.bind_address", config.server.bind_address.clone(), &[]),
        ("server.port", config.server.port.to_string(), &[]),
        ("server.graceful_shutdown_secs", config.server.graceful_shutdown_secs.to_string(), &[]),
        ("seed.mode", format!("{:?}", config.seed.mode), &[]),
        ("seed.count", config.seed.count.to_string(), &[]),
        ("seed.email_domain", config.seed.email_domain.clone(), &[]),
        ("logging.level", config.logging.level.clone(), &["CLIENTELE_LOG_LEVEL"]),
        ("logging.format", format!("{:?}", config.logging.format), &["CLIENTELE_LOG_FORMAT"]),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, aliases) in fields {
        let source = field_source(
            key_path,
            aliases,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    CommandResult::success("config", lines.join("\n"))
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from(DEFAULT_CONFIG_FILE);
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from(NESTED_CONFIG_FILE);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// `database.max_connections` -> `CLIENTELE_DATABASE_MAX_CONNECTIONS`
fn env_key_for(key_path: &str) -> String {
    format!("CLIENTELE_{}", key_path.replace('.', "_").to_ascii_uppercase())
}

fn field_source(
    key_path: &str,
    env_aliases: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let primary = env_key_for(key_path);
    let env_keys = std::iter::once(primary.as_str()).chain(env_aliases.iter().copied());
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
