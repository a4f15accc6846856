use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use floorview::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "floorview")]
#[command(about = "Shop-floor dashboards for machine status, WIP and quality")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve every dashboard page; each request refreshes from the source
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Refresh one page and write the rendered HTML
    Render {
        /// Page: machines, machines-lathes-millturn, machines-mill45ax,
        /// machines-grinding, wip, quality, mrb
        page: String,
        /// CSV location (URL or file path) overriding the configured source
        #[arg(long)]
        source: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Refresh one grid page and print its facet panes with counts
    Facets {
        page: String,
        #[arg(long)]
        source: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show render statistics from the render log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check config files, source reachability and the render log
    Health,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default global config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key (e.g. sources.wip_url) in the global config
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr } => {
            let cfg = config::load();
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            web::serve(&addr, cfg)
        }
        Commands::Render { page, source, out } => {
            cli::run_render(&page, source.as_deref(), out.as_deref())
        }
        Commands::Facets {
            page,
            source,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_facets(&page, source.as_deref(), fmt)
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
