/// Configuration system for floorview.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::FloorviewConfig::default()`]
/// 2. **User global config**: `~/.floorview/config.toml`
/// 3. **Project local config**: `.floorview.toml` in the current working directory
/// 4. **Environment variables**: `FLOORVIEW_*` overrides (highest precedence)
///
/// File layers are merged key by key: a project file that only sets
/// `sources.wip_url` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use floorview::config;
///
/// let cfg = config::load();
/// let source = cfg.sources.wip_url;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::FloorviewConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved floorview configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped so a bad edit never takes the dashboard
/// down.
pub fn load() -> FloorviewConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: FloorviewConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config);
    config
}

/// Read a TOML file into an untyped value tree.
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed.
fn load_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject files that would not deserialize on their own
    let _: FloorviewConfig = value.clone().try_into().ok()?;
    Some(value)
}

/// Deep-merge `overlay` into `base`: tables merge recursively, every other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.floorview/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".floorview").join("config.toml"))
}

/// Path to the project local config: `.floorview.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".floorview.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `FLOORVIEW_MACHINE_URL`: machine status CSV location
/// - `FLOORVIEW_WIP_URL`: WIP CSV location
/// - `FLOORVIEW_WORK_ORDER_URL`: work order CSV location
/// - `FLOORVIEW_ADDR`: dashboard bind address
/// - `FLOORVIEW_LOG`: render log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut FloorviewConfig) {
    if let Ok(val) = std::env::var("FLOORVIEW_MACHINE_URL")
        && !val.is_empty()
    {
        config.sources.machine_url = val;
    }
    if let Ok(val) = std::env::var("FLOORVIEW_WIP_URL")
        && !val.is_empty()
    {
        config.sources.wip_url = val;
    }
    if let Ok(val) = std::env::var("FLOORVIEW_WORK_ORDER_URL")
        && !val.is_empty()
    {
        config.sources.work_order_url = val;
    }
    if let Ok(val) = std::env::var("FLOORVIEW_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("FLOORVIEW_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.floorview/config.toml`.
///
/// Creates the `~/.floorview/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.floorview/ directory")?;
    }

    fs::write(&path, FloorviewConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or the serialized defaults), updates the
/// dotted key (e.g. `sources.wip_url`), and writes the result back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&FloorviewConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The key must already exist; the new value takes the existing value's type.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be dotted (section.key), got '{key}'");
    };

    let mut current = root;
    for part in section.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("unsupported value type for '{key}'"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
