use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod models;
pub use models::*;

/// Prefix for structured overrides, e.g. `STOREFRONT__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "STOREFRONT";

/// Config keys that may be given as comma separated lists in the environment.
const LIST_KEYS: [&str; 3] = [
    "stripe.payment_method_types",
    "contact.operator_addresses",
    "contact.inbound_forward_addresses",
];

/// Loads the application configuration.
///
/// Sources, later ones winning: `config/default.toml`, `config/<RUN_ENV>.toml`,
/// `STOREFRONT__*` environment variables, `secret_from_env` markers, and the
/// short variables of the original deployment (`PORT`, `FRONTEND_URL`, `EMAIL_TO`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = load_config_from(&config_dir, &run_env)?;
    let config = apply_env_overrides_from_marker(config, &|key| env::var(key).ok())?;
    Ok(apply_legacy_env_overrides(config, &|key| env::var(key).ok()))
}

/// Reads the file and `STOREFRONT__*` layers only, without secret injection.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(environment);

    builder.build()?.try_deserialize()
}

/// Recursively replaces all "secret_from_env" string values with environment variable values.
///
/// The variable name is the upper-cased config path joined with `_`, so
/// `stripe.webhook_secret` reads `STRIPE_WEBHOOK_SECRET`.
fn inject_env_secrets(value: &mut Value, lookup: &dyn Fn(&str) -> Option<String>) {
    fn walk(path: &mut Vec<String>, obj: &mut Value, lookup: &dyn Fn(&str) -> Option<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v, lookup);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match lookup(&env_key) {
                    Some(env_val) => *obj = Value::String(env_val),
                    None => warn!(env_key = %env_key, "env var not found for secret_from_env"),
                }
            }
            _ => {}
        }
    }

    walk(&mut Vec::new(), value, lookup);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
pub fn apply_env_overrides_from_marker(
    config: AppConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config is not serializable: {err}")))?;
    inject_env_secrets(&mut json, lookup);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("config no longer deserializes: {err}")))
}

/// Honours `PORT`, `FRONTEND_URL` and `EMAIL_TO` when they are set.
pub fn apply_legacy_env_overrides(
    mut config: AppConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> AppConfig {
    if let Some(port) = lookup("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "ignoring PORT, not a valid port number"),
        }
    }
    if let Some(url) = lookup("FRONTEND_URL").filter(|u| !u.trim().is_empty()) {
        config.frontend_url = Some(url.trim().to_string());
    }
    if let Some(list) = lookup("EMAIL_TO") {
        let addresses: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
        if !addresses.is_empty() {
            config.contact.get_or_insert_with(ContactConfig::default).operator_addresses = addresses;
        }
    }
    config
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` or a first CLI argument starting with `.env` selects the
/// file; the default is `.env`. A missing file is not an error. Returns the
/// path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
