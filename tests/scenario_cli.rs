//! End-to-end replays of scenario scripts, through the library and the binary

use std::io::Write;
use std::process::{Command, Stdio};

use cell_reorder::layout::{CellAndSpan, ItemChange, ItemId};
use cell_reorder::{run_scenario, run_scenario_with_config, RunConfig};
use pretty_assertions::assert_eq;

/// A 2x2 widget dragged in over an icon that must step aside
const WIDGET_DROP: &str = r#"
[grid]
count_x = 3
count_y = 2
cell_size = [100, 100]
icon_size = 40
hint_magnitude = 0.25

[[items]]
id = 1
cell = [1, 0]

[[steps]]
action = "introduce"
id = 7
kind = { type = "widget", min_width = 200, min_height = 200, min_resize_width = 100, min_resize_height = 100 }

[[steps]]
action = "hover"
cell = [0, 0]

[[steps]]
action = "drop"
cell = [0, 0]
"#;

/// An icon picked up, hovered over its neighbor (which makes way) and dragged
/// away again
const PICK_UP_AND_EXIT: &str = r#"
[grid]
count_x = 3
count_y = 1
cell_size = [100, 100]

[[items]]
id = 1
cell = [0, 0]

[[items]]
id = 2
cell = [1, 0]

[[steps]]
action = "pick_up"
item = 1

[[steps]]
action = "hover"
cell = [1, 0]

[[steps]]
action = "exit"
"#;

const RESIZE: &str = r#"
[grid]
count_x = 3
count_y = 1
cell_size = [100, 100]

[[items]]
id = 1
cell = [0, 0]

[[items]]
id = 2
cell = [1, 0]

[[steps]]
action = "resize"
item = 1
cell = [0, 0]
span = [2, 1]
"#;

#[test]
fn test_widget_drop_transcript() {
    let report =
        run_scenario_with_config(WIDGET_DROP, RunConfig::new().with_animations(true)).unwrap();

    insta::assert_snapshot!(report.to_text(true).trim_end(), @r"
    initial
    . 1 .
    . . .

    drag in #7 (2x2)
    . 1 .
    . . .

    hover (100, 100) -> (0, 0) 2x2
    7 7 1
    7 7 .
      move #1 to (2, 0) 1x1 over 150ms
      hint #1 by (-10, 0)

    drop (100, 100) -> (0, 0) 2x2
    7 7 1
    7 7 .
      move #1 to (2, 0) 1x1 over 150ms
      settle #1 over 150ms
    ");

    assert_eq!(
        report.changes,
        vec![ItemChange {
            id: ItemId(1),
            previous: CellAndSpan::new(1, 0, 1, 1),
            current: CellAndSpan::new(2, 0, 1, 1),
        }]
    );
}

#[test]
fn test_exit_reverts_preview() {
    let report = run_scenario(PICK_UP_AND_EXIT).unwrap();

    insta::assert_snapshot!(report.to_text(false).trim_end(), @r"
    initial
    1 2 .

    pick up #1
    1 2 .

    hover (150, 50) -> (1, 0) 1x1
    . 1 2

    exit
    1 2 .
    ");
    assert!(report.changes.is_empty());
}

#[test]
fn test_resize_pushes_neighbor() {
    let report = run_scenario(RESIZE).unwrap();

    assert_eq!(report.frames[0].label, "resize #1 to (0, 0) 2x1 -> ok");
    assert_eq!(report.final_grid(), "1 1 2");
    assert_eq!(
        report.changes,
        vec![
            ItemChange {
                id: ItemId(1),
                previous: CellAndSpan::new(0, 0, 1, 1),
                current: CellAndSpan::new(0, 0, 2, 1),
            },
            ItemChange {
                id: ItemId(2),
                previous: CellAndSpan::new(1, 0, 1, 1),
                current: CellAndSpan::new(2, 0, 1, 1),
            },
        ]
    );
}

#[test]
fn test_overlapping_items_are_skipped() {
    let report = run_scenario(
        r#"
[grid]
count_x = 2
count_y = 1

[[items]]
id = 1
cell = [0, 0]

[[items]]
id = 2
cell = [0, 0]
"#,
    )
    .unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.final_grid(), "1 .");
}

#[test]
fn test_binary_prints_final_grid() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cell-reorder"))
        .arg("--quiet")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(RESIZE.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1 1 2\n");
}

#[test]
fn test_binary_reports_bad_script() {
    let output = Command::new(env!("CARGO_BIN_EXE_cell-reorder"))
        .arg("/nonexistent/scenario.toml")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading file"));
}
