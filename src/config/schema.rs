/// Configuration schema and defaults for floorview.
///
/// Defines the TOML-serializable configuration structure with sections
/// `[sources]`, `[server]`, `[assets]`, and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level floorview configuration.
///
/// Maps directly to the `~/.floorview/config.toml` and `.floorview.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorviewConfig {
    pub sources: SourcesConfig,
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [sources]
// ---------------------------------------------------------------------------

/// Locations of the three CSV snapshots.
///
/// Each value may be an `http(s)://` URL, a `file://` URL, or a local path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Machine status snapshot (`device_name`, `power_status`, ...).
    pub machine_url: String,
    /// Work-in-progress snapshot.
    pub wip_url: String,
    /// Work order snapshot feeding the quality and MRB views.
    pub work_order_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            machine_url: "https://ryanzcode.github.io/dishon-pages/data/machine_statuses.csv"
                .to_string(),
            wip_url: "http://192.168.1.75/data/wip_data.csv".to_string(),
            work_order_url: "http://192.168.1.75/data/wo_data.csv".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for `floorview serve`.
    pub addr: String,
    /// Open the index page in the default browser on startup.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [assets]
// ---------------------------------------------------------------------------

/// Stylesheet and script bundles referenced by rendered pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub bootstrap_css: String,
    /// DataTables bundle with Buttons, ColReorder, SearchPanes and Select.
    pub datatables_css: String,
    pub datatables_js: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            bootstrap_css:
                "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                    .to_string(),
            datatables_css: "https://cdn.datatables.net/v/dt/jszip-3.10.1/dt-2.0.8/b-3.0.2/b-html5-3.0.2/b-print-3.0.2/cr-2.0.3/sp-2.3.1/sl-2.0.3/datatables.min.css".to_string(),
            datatables_js: "https://cdn.datatables.net/v/dt/jq-3.7.0/jszip-3.10.1/dt-2.0.8/b-3.0.2/b-html5-3.0.2/b-print-3.0.2/cr-2.0.3/sp-2.3.1/sl-2.0.3/datatables.min.js".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Render log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSONL entry per pipeline run to `~/.floorview/render-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl FloorviewConfig {
    /// The annotated TOML written by `floorview config init`.
    pub fn default_toml() -> String {
        let defaults = Self::default();
        format!(
            r#"# floorview Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (FLOORVIEW_*)
#   2. Project config (.floorview.toml in current directory)
#   3. User global config (~/.floorview/config.toml)
#   4. Built-in defaults

[sources]
# http(s):// URL, file:// URL, or local path
machine_url = "{machine}"
wip_url = "{wip}"
work_order_url = "{work_order}"

[server]
addr = "{addr}"
open_browser = true

[assets]
bootstrap_css = "{bootstrap}"
datatables_css = "{dt_css}"
datatables_js = "{dt_js}"

[logging]
enabled = true   # Set false or FLOORVIEW_LOG=0 to stop writing render-log.jsonl
"#,
            machine = defaults.sources.machine_url,
            wip = defaults.sources.wip_url,
            work_order = defaults.sources.work_order_url,
            addr = defaults.server.addr,
            bootstrap = defaults.assets.bootstrap_css,
            dt_css = defaults.assets.datatables_css,
            dt_js = defaults.assets.datatables_js,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = FloorviewConfig::default();
        assert!(config.sources.wip_url.ends_with("wip_data.csv"));
        assert!(config.sources.work_order_url.ends_with("wo_data.csv"));
        assert_eq!(config.server.addr, "127.0.0.1:9747");
        assert!(config.logging.enabled);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[sources]
wip_url = "/srv/data/wip.csv"
"#;
        let config: FloorviewConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sources.wip_url, "/srv/data/wip.csv");
        // Untouched keys fall back to defaults
        assert_eq!(
            config.sources.machine_url,
            SourcesConfig::default().machine_url
        );
        assert!(config.server.open_browser);
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: FloorviewConfig = toml::from_str("").unwrap();
        assert_eq!(config, FloorviewConfig::default());
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = FloorviewConfig::default_toml();
        let config: FloorviewConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, FloorviewConfig::default());
    }
}
