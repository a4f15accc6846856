//! Machine status routing.
//!
//! Each record's `machine_category` selects a container; `power_status`
//! selects the tile state. A view restricts which categories are routed.

use serde::Serialize;

use crate::dataset::{Dataset, Record};

use super::Classified;

pub const DEVICE_NAME: &str = "device_name";
pub const POWER_STATUS: &str = "power_status";
pub const UPTIME_PERCENT: &str = "uptime_percent";
pub const MACHINE_CATEGORY: &str = "machine_category";

const TILE_FIELDS: [&str; 4] = [DEVICE_NAME, POWER_STATUS, UPTIME_PERCENT, MACHINE_CATEGORY];

// ---------------------------------------------------------------------------
// Categories and states
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MachineCategory {
    Lathes,
    Millturn,
    Mill4ax,
    Mill5ax,
    Grinding,
}

impl MachineCategory {
    pub const ALL: [Self; 5] = [
        Self::Lathes,
        Self::Millturn,
        Self::Mill4ax,
        Self::Mill5ax,
        Self::Grinding,
    ];

    /// Exact, case-sensitive match on the CSV value.
    pub fn from_field(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lathes => "Lathes",
            Self::Millturn => "Millturn",
            Self::Mill4ax => "Mill4ax",
            Self::Mill5ax => "Mill5ax",
            Self::Grinding => "Grinding",
        }
    }

    /// Id of the page container receiving this category's tiles.
    pub fn container_id(self) -> &'static str {
        match self {
            Self::Lathes => "lathes",
            Self::Millturn => "millturn",
            Self::Mill4ax => "mill4ax",
            Self::Mill5ax => "mill5ax",
            Self::Grinding => "grinding",
        }
    }
}

/// Tile state derived from `power_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    On,
    Idle,
    Off,
}

impl PowerState {
    /// `2` is on, `1` is idle, anything else (including blank) is off.
    /// The comparison is numeric, so `" 2"` and `"2.0"` also read as on.
    pub fn from_field(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(v) if v == 2.0 => Self::On,
            Ok(v) if v == 1.0 => Self::Idle,
            _ => Self::Off,
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            Self::On => "machine-on",
            Self::Idle => "machine-idle",
            Self::Off => "machine-off",
        }
    }
}

/// A rendered machine tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineTile {
    pub name: String,
    pub uptime_percent: String,
    pub state: PowerState,
}

impl MachineTile {
    /// Build a tile, or `None` when the record has no device name.
    pub fn from_record(record: &Record) -> Option<Self> {
        if record.is_blank(DEVICE_NAME) {
            return None;
        }
        Some(Self {
            name: record.value(DEVICE_NAME).to_string(),
            uptime_percent: record.value(UPTIME_PERCENT).to_string(),
            state: PowerState::from_field(record.value(POWER_STATUS)),
        })
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

const LATHES_MILLTURN: &[MachineCategory] = &[MachineCategory::Lathes, MachineCategory::Millturn];
const MILL_45AX: &[MachineCategory] = &[MachineCategory::Mill4ax, MachineCategory::Mill5ax];
const MILL_GRINDING: &[MachineCategory] = &[
    MachineCategory::Mill4ax,
    MachineCategory::Mill5ax,
    MachineCategory::Grinding,
];
const GRINDING: &[MachineCategory] = &[MachineCategory::Grinding];

/// Which machine categories a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineView {
    All,
    LathesMillturn,
    Mill45ax,
    Grinding,
}

impl MachineView {
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::LathesMillturn,
        Self::Mill45ax,
        Self::Grinding,
    ];

    /// Branch chains evaluated per record. Within a chain the first match
    /// wins; chains are independent of each other. The full view keeps the
    /// 4/5-axis and grinding checks as a second chain after lathes/millturn.
    pub fn chains(self) -> &'static [&'static [MachineCategory]] {
        match self {
            Self::All => &[LATHES_MILLTURN, MILL_GRINDING],
            Self::LathesMillturn => &[LATHES_MILLTURN],
            Self::Mill45ax => &[MILL_45AX],
            Self::Grinding => &[GRINDING],
        }
    }

    /// Categories routed by this view, in container order.
    pub fn categories(self) -> Vec<MachineCategory> {
        self.chains().iter().flat_map(|c| c.iter().copied()).collect()
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::LathesMillturn => "lathes-millturn",
            Self::Mill45ax => "mill45ax",
            Self::Grinding => "grinding",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::All => "All Machines",
            Self::LathesMillturn => "Lathes / Millturn",
            Self::Mill45ax => "Mill 4/5-Axis",
            Self::Grinding => "Grinding",
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Route every record of the dataset through `view`.
///
/// Output preserves dataset order. Records with an unrecognised category
/// are dropped; records with a blank device name are skipped.
pub fn route(dataset: &Dataset, view: MachineView) -> Classified<(MachineCategory, MachineTile)> {
    let mut out = Classified::default();

    for record in dataset {
        let category = MachineCategory::from_field(record.value(MACHINE_CATEGORY));
        let mut routed = false;

        for chain in view.chains() {
            let Some(hit) = chain.iter().copied().find(|c| Some(*c) == category) else {
                continue;
            };
            routed = true;
            match MachineTile::from_record(record) {
                Some(tile) => {
                    out.missing_fields += record.count_missing(&TILE_FIELDS);
                    out.items.push((hit, tile));
                }
                None => out.skipped += 1,
            }
        }

        if !routed {
            out.dropped += 1;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
