/// End-to-end page refresh tests.
///
/// Each test writes a CSV snapshot to a temp dir, points a controller at it
/// and inspects the rebuilt page and its HTML rendering.
use std::fs;
use std::path::Path;

use floorview::classify::machines::{self, MachineCategory, MachineView};
use floorview::config::schema::AssetsConfig;
use floorview::dataset;
use floorview::fetch::Source;
use floorview::page::controller::{Controller, Stage};
use floorview::page::html::render_document;
use floorview::page::{PageKind, TILE_CLASS};

const MACHINES_CSV: &str = "\
device_name,power_status,uptime_percent,machine_category,timestamp
L-01,2,87,Lathes,2024-03-01 07:15
MT-02,1,40,Millturn,
G-03,0,12,Grinding,
,2,99,Lathes,
X-04,2,50,Welding,
";

fn snapshot(dir: &Path, name: &str, text: &str) -> Source {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    Source::File(path)
}

fn tiles(controller: &Controller, container: &str) -> usize {
    controller
        .page()
        .nodes(container)
        .iter()
        .filter(|n| n.class() == Some(TILE_CLASS))
        .count()
}

// ---------------------------------------------------------------------------
// Machine routing
// ---------------------------------------------------------------------------

#[test]
fn grinding_routes_by_view() {
    let ds = dataset::parse(MACHINES_CSV).unwrap();

    let all = machines::route(&ds, MachineView::All);
    assert!(all.items.iter().any(|(c, _)| *c == MachineCategory::Grinding));

    let grinding = machines::route(&ds, MachineView::Grinding);
    assert_eq!(grinding.items.len(), 1);
    assert_eq!(grinding.items[0].1.name, "G-03");

    let lathes = machines::route(&ds, MachineView::LathesMillturn);
    assert!(lathes.items.iter().all(|(c, _)| *c != MachineCategory::Grinding));
}

#[test]
fn blank_device_name_produces_no_tile() {
    let ds = dataset::parse(MACHINES_CSV).unwrap();
    let routed = machines::route(&ds, MachineView::All);

    let names: Vec<&str> = routed.items.iter().map(|(_, t)| t.name.as_str()).collect();
    assert_eq!(names, ["L-01", "MT-02", "G-03"]);
    assert_eq!(routed.skipped, 1);
    // Welding plus the blank trailer
    assert_eq!(routed.dropped, 2);
}

#[test]
fn machine_page_renders_tiles_and_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let source = snapshot(dir.path(), "machines.csv", MACHINES_CSV);
    let mut controller = Controller::new(PageKind::Machines(MachineView::All), source);

    let outcome = controller.refresh();
    assert!(outcome.success);
    assert_eq!(outcome.rows, 3);
    assert_eq!(tiles(&controller, "lathes"), 1);
    assert_eq!(tiles(&controller, "grinding"), 1);
    assert_eq!(
        controller.page().timestamp(),
        Some("Last updated: 2024-03-01 07:15")
    );

    let html = render_document(controller.page(), &AssetsConfig::default());
    assert!(html.contains(
        r#"<div class="col-md border border-dark fs-3 text-center machine-on">L-01<br>87%</div>"#
    ));
    assert!(html.contains(r#"id="current-time""#));
}

// ---------------------------------------------------------------------------
// Refresh lifecycle
// ---------------------------------------------------------------------------

#[test]
fn repeated_refresh_renders_identical_page() {
    let dir = tempfile::tempdir().unwrap();
    let source = snapshot(dir.path(), "machines.csv", MACHINES_CSV);
    let mut controller = Controller::new(PageKind::Machines(MachineView::All), source);
    let assets = AssetsConfig::default();

    controller.refresh();
    let first = render_document(controller.page(), &assets);
    controller.refresh();
    let second = render_document(controller.page(), &assets);

    assert_eq!(first, second);
    assert_eq!(tiles(&controller, "lathes"), 1);
}

#[test]
fn missing_snapshot_shows_banner_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wo_data.csv");
    let mut controller = Controller::new(PageKind::Mrb, Source::File(path.clone()));

    let failed = controller.refresh();
    assert!(!failed.success);
    assert_eq!(controller.stage(), Stage::Error);
    assert!(controller.page().grid().is_none());
    let html = render_document(controller.page(), &AssetsConfig::default());
    assert!(html.contains("Failed to load data"));

    fs::write(
        &path,
        "wo_num,in_quality,part_num,description,qty,date,progress,mrb,mrb_qty,mrb_date,timestamp\n\
         31050,2,P-1,Bracket,5,2023-02-01,1/2,True,1,2023-05-06,2024-03-01 07:00\n\
         31060,2,P-2,Shaft,5,2023-02-01,1/2,False,0,,\n",
    )
    .unwrap();

    let recovered = controller.refresh();
    assert!(recovered.success);
    assert_eq!(controller.stage(), Stage::Idle);
    assert_eq!(recovered.rows, 1);
    let html = render_document(controller.page(), &AssetsConfig::default());
    assert!(!html.contains("Failed to load data"));
    assert!(html.contains(r#"id="qualityTable""#));
}
