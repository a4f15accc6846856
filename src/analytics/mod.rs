//! Render log: one JSONL entry per page refresh, plus aggregation.

pub mod logger;
pub mod reporter;

use crate::config::schema::LoggingConfig;
use crate::page::controller::RenderOutcome;

/// Log `outcome` unless logging is switched off.
pub fn record(outcome: &RenderOutcome, logging: &LoggingConfig) {
    if logging.enabled {
        logger::log_render(outcome);
    }
}
