//! Dashboard pages.
//!
//! A [`Page`] is the server-side stand-in for the browser document: a fixed
//! set of id'd containers holding rendered nodes. Controllers
//! ([`controller`]) tear containers down and refill them on every refresh;
//! [`html`] serializes the result.

pub mod controller;
pub mod html;

use serde::Serialize;

use crate::classify::machines::{MachineCategory, MachineTile, MachineView};
use crate::config::schema::SourcesConfig;
use crate::grid::Grid;

/// Class carried by every machine tile; teardown removes nodes by it.
pub const TILE_CLASS: &str = "col-md";

/// Container ids used by the grid pages.
pub const TABLE_CONTAINER: &str = "tableContainer";
pub const TIMESTAMP_CONTAINER: &str = "timestampContainer";

/// Container id holding the machine page timestamp.
pub const MACHINE_TIMESTAMP_CONTAINER: &str = "timestamp";

/// Container id for the load-failure banner (every page).
pub const STATUS_CONTAINER: &str = "status";

// ---------------------------------------------------------------------------
// Page kinds
// ---------------------------------------------------------------------------

/// Which dashboard a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageKind {
    Machines(MachineView),
    Wip,
    Quality,
    Mrb,
}

impl PageKind {
    pub const ALL: [Self; 7] = [
        Self::Machines(MachineView::All),
        Self::Machines(MachineView::LathesMillturn),
        Self::Machines(MachineView::Mill45ax),
        Self::Machines(MachineView::Grinding),
        Self::Wip,
        Self::Quality,
        Self::Mrb,
    ];

    /// CLI name (`machines`, `machines-grinding`, `wip`, ...).
    pub fn slug(self) -> String {
        match self {
            Self::Machines(MachineView::All) => "machines".to_string(),
            Self::Machines(view) => format!("machines-{}", view.slug()),
            Self::Wip => "wip".to_string(),
            Self::Quality => "quality".to_string(),
            Self::Mrb => "mrb".to_string(),
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Web route serving this page.
    pub fn path(self) -> String {
        match self {
            Self::Machines(view) => format!("/machines/{}", view.slug()),
            Self::Wip => "/wip".to_string(),
            Self::Quality => "/quality".to_string(),
            Self::Mrb => "/mrb".to_string(),
        }
    }

    /// Resolve a request path. `/machines` alone is the full view.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path == "/machines" {
            return Some(Self::Machines(MachineView::All));
        }
        Self::ALL.into_iter().find(|k| k.path() == path)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Machines(view) => view.title(),
            Self::Wip => "Work in Progress",
            Self::Quality => "Quality",
            Self::Mrb => "MRB",
        }
    }

    /// Configured location of the snapshot feeding this page.
    pub fn source_location(self, sources: &SourcesConfig) -> &str {
        match self {
            Self::Machines(_) => &sources.machine_url,
            Self::Wip => &sources.wip_url,
            Self::Quality | Self::Mrb => &sources.work_order_url,
        }
    }

    /// Id of the timestamp element the stamper replaces.
    pub fn timestamp_id(self) -> &'static str {
        match self {
            Self::Machines(_) => "current-time",
            _ => "timestamp",
        }
    }

    /// Container receiving the timestamp element.
    pub fn timestamp_container(self) -> &'static str {
        match self {
            Self::Machines(_) => MACHINE_TIMESTAMP_CONTAINER,
            _ => TIMESTAMP_CONTAINER,
        }
    }

    fn container_ids(self) -> Vec<&'static str> {
        let mut ids = vec![STATUS_CONTAINER];
        match self {
            Self::Machines(view) => {
                ids.extend(view.categories().into_iter().map(MachineCategory::container_id));
                ids.push(MACHINE_TIMESTAMP_CONTAINER);
            }
            _ => {
                ids.push(TIMESTAMP_CONTAINER);
                ids.push(TABLE_CONTAINER);
            }
        }
        ids
    }
}

// ---------------------------------------------------------------------------
// Nodes and containers
// ---------------------------------------------------------------------------

/// A rendered element inside a container.
#[derive(Debug, Clone)]
pub enum Node {
    Tile {
        category: MachineCategory,
        tile: MachineTile,
    },
    Grid(Box<Grid>),
    Timestamp {
        id: &'static str,
        text: String,
    },
    Banner {
        message: String,
    },
}

impl Node {
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::Tile { .. } => Some(TILE_CLASS),
            Self::Banner { .. } => Some("load-error"),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Grid(grid) => Some(grid.table_id()),
            Self::Timestamp { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub id: &'static str,
    pub nodes: Vec<Node>,
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Page {
    kind: PageKind,
    containers: Vec<Container>,
}

impl Page {
    /// An empty page with the containers its kind requires.
    pub fn new(kind: PageKind) -> Self {
        let containers = kind
            .container_ids()
            .into_iter()
            .map(|id| Container {
                id,
                nodes: Vec::new(),
            })
            .collect();
        Self { kind, containers }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    /// Append `node` to container `id`. Returns `false` if the page has no
    /// such container.
    pub fn append(&mut self, id: &str, node: Node) -> bool {
        match self.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.nodes.push(node);
                true
            }
            None => false,
        }
    }

    /// Remove every node carrying `class`, in any container.
    pub fn remove_by_class(&mut self, class: &str) -> usize {
        self.remove_where(|n| n.class() == Some(class))
    }

    /// Remove every node with element id `id`, in any container.
    pub fn remove_by_id(&mut self, id: &str) -> usize {
        self.remove_where(|n| n.id() == Some(id))
    }

    /// Empty one container.
    pub fn clear(&mut self, id: &str) {
        if let Some(container) = self.containers.iter_mut().find(|c| c.id == id) {
            container.nodes.clear();
        }
    }

    /// Nodes in container `id` (empty if absent).
    pub fn nodes(&self, id: &str) -> &[Node] {
        self.container(id).map(|c| c.nodes.as_slice()).unwrap_or(&[])
    }

    /// The grid currently in the table container, if any.
    pub fn grid(&self) -> Option<&Grid> {
        self.nodes(TABLE_CONTAINER).iter().find_map(|n| match n {
            Node::Grid(grid) => Some(grid.as_ref()),
            _ => None,
        })
    }

    /// Text of the current timestamp element, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.nodes(self.kind.timestamp_container())
            .iter()
            .find_map(|n| match n {
                Node::Timestamp { text, .. } => Some(text.as_str()),
                _ => None,
            })
    }

    /// Facet panes of the current grid with their counts, as reported by
    /// `floorview facets` and `/api/facets/<page>`.
    pub fn facet_summary(&self) -> serde_json::Value {
        let panes: Vec<serde_json::Value> = self
            .grid()
            .map(|grid| grid.panes())
            .unwrap_or(&[])
            .iter()
            .map(|pane| {
                let options: Vec<serde_json::Value> = pane
                    .entries()
                    .map(|(option, count)| {
                        serde_json::json!({
                            "label": option.label,
                            "count": count,
                            "predicate": option.predicate,
                        })
                    })
                    .collect();
                serde_json::json!({
                    "header": pane.header,
                    "column": pane.column,
                    "options": options,
                })
            })
            .collect();

        serde_json::json!({
            "page": self.kind.slug(),
            "table_id": self.grid().map(Grid::table_id),
            "panes": panes,
        })
    }

    fn remove_where(&mut self, pred: impl Fn(&Node) -> bool) -> usize {
        let mut removed = 0;
        for container in &mut self.containers {
            let before = container.nodes.len();
            container.nodes.retain(|n| !pred(n));
            removed += before - container.nodes.len();
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::machines::PowerState;

    fn tile(name: &str) -> Node {
        Node::Tile {
            category: MachineCategory::Lathes,
            tile: MachineTile {
                name: name.to_string(),
                uptime_percent: "50".to_string(),
                state: PowerState::On,
            },
        }
    }

    #[test]
    fn slugs_and_paths_round_trip() {
        for kind in PageKind::ALL {
            assert_eq!(PageKind::from_slug(&kind.slug()), Some(kind));
            assert_eq!(PageKind::from_path(&kind.path()), Some(kind));
        }
        assert_eq!(
            PageKind::from_path("/machines"),
            Some(PageKind::Machines(MachineView::All))
        );
        assert_eq!(PageKind::from_slug("machines-mill45ax"), Some(PageKind::Machines(MachineView::Mill45ax)));
        assert_eq!(PageKind::from_path("/nope"), None);
    }

    #[test]
    fn machine_pages_have_view_containers() {
        let page = Page::new(PageKind::Machines(MachineView::All));
        for id in ["lathes", "millturn", "mill4ax", "mill5ax", "grinding", "timestamp"] {
            assert!(page.container(id).is_some(), "missing #{id}");
        }
        let grinding = Page::new(PageKind::Machines(MachineView::Grinding));
        assert!(grinding.container("grinding").is_some());
        assert!(grinding.container("lathes").is_none());
    }

    #[test]
    fn grid_pages_have_table_and_timestamp_containers() {
        let page = Page::new(PageKind::Quality);
        assert!(page.container(TABLE_CONTAINER).is_some());
        assert!(page.container(TIMESTAMP_CONTAINER).is_some());
    }

    #[test]
    fn remove_by_class_clears_tiles_everywhere() {
        let mut page = Page::new(PageKind::Machines(MachineView::All));
        assert!(page.append("lathes", tile("L1")));
        assert!(page.append("millturn", tile("M1")));
        assert!(page.append(
            "timestamp",
            Node::Timestamp {
                id: "current-time",
                text: "Last updated: now".to_string()
            }
        ));

        assert_eq!(page.remove_by_class(TILE_CLASS), 2);
        assert!(page.nodes("lathes").is_empty());
        assert_eq!(page.timestamp(), Some("Last updated: now"));
        assert_eq!(page.remove_by_id("current-time"), 1);
        assert_eq!(page.timestamp(), None);
    }

    #[test]
    fn append_to_unknown_container_fails() {
        let mut page = Page::new(PageKind::Wip);
        assert!(!page.append("lathes", tile("L1")));
    }

    #[test]
    fn source_location_follows_page() {
        let sources = SourcesConfig::default();
        assert_eq!(PageKind::Mrb.source_location(&sources), sources.work_order_url);
        assert_eq!(PageKind::Wip.source_location(&sources), sources.wip_url);
        assert_eq!(
            PageKind::Machines(MachineView::Grinding).source_location(&sources),
            sources.machine_url
        );
    }
}
