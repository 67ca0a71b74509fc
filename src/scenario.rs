//! Scripted drag scenarios
//!
//! A scenario is a TOML file describing a grid, the items placed on it and a
//! script of drag steps. Replaying it drives a [`CellLayout`] exactly the way
//! a drag controller would and records the grid after every step.
//!
//! ```toml
//! [grid]
//! count_x = 4
//! count_y = 4
//!
//! [[items]]
//! id = 1
//! cell = [0, 0]
//! kind = { type = "widget", min_width = 160, min_height = 80 }
//!
//! [[steps]]
//! action = "introduce"
//! id = 7
//!
//! [[steps]]
//! action = "drop"
//! cell = [0, 0]
//! ```

use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::layout::{
    AnimationEvent, CellAndSpan, CellLayout, CellMetrics, CellPos, CellSpan, Direction,
    DragSession, DropMode, DropOutcome, GridConfig, GridItem, ItemChange, ItemId, ItemKind,
    LayoutError, PixelPoint, RecordingAnimator,
};
use crate::render::{render_grid, render_grid_with_overlay};
use crate::RunError;

/// Errors that can occur when loading or replaying a scenario
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scenario TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("step {step}: item {id} is not on the grid")]
    UnknownItem { step: usize, id: ItemId },
    #[error("step {step}: `{action}` needs a drag in progress")]
    NoActiveDrag { step: usize, action: &'static str },
    #[error("step {step}: item {id} is already on the grid")]
    DuplicateItem { step: usize, id: ItemId },
    #[error("step {step}: a drag is already in progress")]
    DragInProgress { step: usize },
    #[error("step {step}: `{action}` needs a `cell` or a `pixel`")]
    MissingTarget { step: usize, action: &'static str },
}

fn default_kind() -> ItemKind {
    ItemKind::Shortcut
}

fn default_true() -> bool {
    true
}

/// An item placed on the grid before the script starts
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub id: u64,
    pub cell: [i32; 2],
    #[serde(default = "default_kind")]
    pub kind: ItemKind,
    /// Defaults to the span derived from `kind`
    #[serde(default)]
    pub span: Option<[i32; 2]>,
    /// Never displaced by a reorder
    #[serde(default)]
    pub fixed: bool,
}

impl ItemSpec {
    pub fn to_item(&self, metrics: &CellMetrics) -> GridItem {
        let (kind_span, _) = self.kind.spans(metrics);
        let span = self
            .span
            .map(|[x, y]| CellSpan::new(x, y))
            .unwrap_or(kind_span);
        let can_reorder = self.kind.can_reorder() && !self.fixed;
        GridItem::new(
            ItemId(self.id),
            self.kind.clone(),
            CellPos::new(self.cell[0], self.cell[1]),
            span,
        )
        .with_can_reorder(can_reorder)
    }
}

/// One step of a drag script
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Pick up an item already on the grid
    PickUp { item: u64 },
    /// Start dragging a new item in from outside the grid
    Introduce {
        id: u64,
        #[serde(default = "default_kind")]
        kind: ItemKind,
        #[serde(default)]
        span: Option<[i32; 2]>,
        #[serde(default)]
        min_span: Option<[i32; 2]>,
    },
    /// Hover over a cell (or pixel) and preview the arrangement
    Hover {
        #[serde(default)]
        cell: Option<[i32; 2]>,
        #[serde(default)]
        pixel: Option<[i32; 2]>,
    },
    /// Release the dragged item
    Drop {
        #[serde(default)]
        cell: Option<[i32; 2]>,
        #[serde(default)]
        pixel: Option<[i32; 2]>,
    },
    /// Drag off the grid; the preview is reverted
    Exit,
    /// Resize an item in place, pushing neighbors out of the way
    Resize {
        item: u64,
        cell: [i32; 2],
        span: [i32; 2],
        #[serde(default)]
        direction: Option<[i32; 2]>,
        #[serde(default = "default_true")]
        commit: bool,
    },
    /// Take an item off the grid
    Remove { item: u64 },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::PickUp { .. } => "pick_up",
            Step::Introduce { .. } => "introduce",
            Step::Hover { .. } => "hover",
            Step::Drop { .. } => "drop",
            Step::Exit => "exit",
            Step::Resize { .. } => "resize",
            Step::Remove { .. } => "remove",
        }
    }
}

/// A grid, its items and a drag script
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scenario from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    /// Replay the script and record the grid after each step
    pub fn replay(&self, record_animations: bool) -> Result<ScenarioReport, RunError> {
        Replay::new(self, record_animations).run()
    }
}

/// The grid after one step
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub label: String,
    pub grid: String,
    pub animations: Vec<AnimationEvent>,
}

/// Everything a replay produced
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    /// Grid before the first step
    pub initial: String,
    pub frames: Vec<Frame>,
    /// Placement changes committed by drops and resizes, in order
    pub changes: Vec<ItemChange>,
    /// Items that could not be placed initially
    pub rejected: Vec<LayoutError>,
}

impl ScenarioReport {
    /// Grid after the last step
    pub fn final_grid(&self) -> &str {
        self.frames
            .last()
            .map(|f| f.grid.as_str())
            .unwrap_or(&self.initial)
    }

    /// Human-readable transcript
    pub fn to_text(&self, with_animations: bool) -> String {
        let mut out = String::new();
        for err in &self.rejected {
            out.push_str(&format!("skipped: {}\n", err));
        }
        out.push_str("initial\n");
        out.push_str(&self.initial);
        out.push('\n');
        for frame in &self.frames {
            out.push('\n');
            out.push_str(&frame.label);
            out.push('\n');
            out.push_str(&frame.grid);
            out.push('\n');
            if with_animations {
                for event in &frame.animations {
                    out.push_str(&format!("  {}\n", event));
                }
            }
        }
        out
    }
}

/// A drag in progress
struct Gesture {
    session: DragSession,
    span: CellSpan,
    min_span: CellSpan,
    /// Item being dragged in from outside the grid
    incoming: Option<GridItem>,
}

struct Replay<'a> {
    scenario: &'a Scenario,
    layout: CellLayout,
    recorder: Option<RecordingAnimator>,
    gesture: Option<Gesture>,
    /// Where an incoming item would land, for drawing
    preview: Option<(ItemId, CellAndSpan)>,
    changes: Vec<ItemChange>,
}

impl<'a> Replay<'a> {
    fn new(scenario: &'a Scenario, record_animations: bool) -> Self {
        let recorder = record_animations.then(RecordingAnimator::new);
        let layout = match &recorder {
            Some(recorder) => {
                CellLayout::with_animator(scenario.grid.clone(), Box::new(recorder.clone()))
            }
            None => CellLayout::new(scenario.grid.clone()),
        };
        Self {
            scenario,
            layout,
            recorder,
            gesture: None,
            preview: None,
            changes: Vec::new(),
        }
    }

    fn run(mut self) -> Result<ScenarioReport, RunError> {
        let metrics = *self.layout.metrics();
        let rejected = self
            .layout
            .restore_items(self.scenario.items.iter().map(|spec| spec.to_item(&metrics)));
        let initial = render_grid(&self.layout);

        let mut frames = Vec::new();
        for (index, step) in self.scenario.steps.iter().enumerate() {
            let label = self.apply(index + 1, step)?;
            debug!("step {}: {}", index + 1, label);
            frames.push(Frame {
                label,
                grid: render_grid_with_overlay(&self.layout, self.preview),
                animations: self.recorder.as_ref().map(|r| r.take()).unwrap_or_default(),
            });
        }
        info!(
            "replayed {} step(s), {} committed change(s)",
            frames.len(),
            self.changes.len()
        );

        Ok(ScenarioReport {
            initial,
            frames,
            changes: self.changes,
            rejected,
        })
    }

    fn apply(&mut self, step: usize, action: &Step) -> Result<String, RunError> {
        match action {
            Step::PickUp { item } => {
                self.ensure_idle(step)?;
                let id = ItemId(*item);
                let picked = self
                    .layout
                    .item(id)
                    .ok_or(ScenarioError::UnknownItem { step, id })?;
                let span = picked.committed().span();
                let (_, min) = picked.kind().spans(self.layout.metrics());
                let min_span = CellSpan::new(min.x.min(span.x), min.y.min(span.y));

                self.layout.prepare_child_for_drag(id)?;
                self.layout.on_drag_enter();
                self.gesture = Some(Gesture {
                    session: DragSession::for_item(id),
                    span,
                    min_span,
                    incoming: None,
                });
                Ok(format!("pick up {}", id))
            }
            Step::Introduce {
                id,
                kind,
                span,
                min_span,
            } => {
                self.ensure_idle(step)?;
                if self.layout.item(ItemId(*id)).is_some() {
                    return Err(ScenarioError::DuplicateItem {
                        step,
                        id: ItemId(*id),
                    }
                    .into());
                }
                let (kind_span, kind_min) = kind.spans(self.layout.metrics());
                let span = span.map(|[x, y]| CellSpan::new(x, y)).unwrap_or(kind_span);
                let min_span = min_span
                    .map(|[x, y]| CellSpan::new(x, y))
                    .unwrap_or(CellSpan::new(kind_min.x.min(span.x), kind_min.y.min(span.y)));
                let incoming =
                    GridItem::new(ItemId(*id), kind.clone(), CellPos::new(-1, -1), span);

                self.layout.on_drag_enter();
                self.gesture = Some(Gesture {
                    session: DragSession::external(),
                    span,
                    min_span,
                    incoming: Some(incoming),
                });
                Ok(format!("drag in #{} ({}x{})", id, span.x, span.y))
            }
            Step::Hover { cell, pixel } => {
                let pixel = self.target(step, action, *cell, *pixel)?;
                let outcome = self.create_area(step, action, pixel, DropMode::DragOver)?;
                self.preview = match (&outcome.placement, self.incoming_id()) {
                    (Some(placement), Some(id)) => Some((id, *placement)),
                    _ => None,
                };
                Ok(format!("hover ({}, {}) -> {}", pixel.x, pixel.y, describe(&outcome)))
            }
            Step::Drop { cell, pixel } => {
                let pixel = self.target(step, action, *cell, *pixel)?;
                let internal = self.incoming_id().is_none();
                let mode = if internal {
                    DropMode::OnDrop
                } else {
                    DropMode::OnDropExternal
                };
                let outcome = self.create_area(step, action, pixel, mode)?;
                let Some(mut gesture) = self.gesture.take() else {
                    return Err(ScenarioError::NoActiveDrag {
                        step,
                        action: action.name(),
                    }
                    .into());
                };
                self.preview = None;
                self.changes.extend(outcome.changes.iter().copied());

                match (outcome.placement, gesture.incoming.take()) {
                    (Some(placement), Some(mut incoming)) => {
                        incoming.set_committed(placement);
                        self.layout.add_item(incoming)?;
                    }
                    (None, None) => {
                        if let Some(id) = gesture.session.dragged() {
                            self.layout.on_drop_completed(id)?;
                        }
                    }
                    _ => {}
                }
                self.layout.on_drag_exit();
                Ok(format!("drop ({}, {}) -> {}", pixel.x, pixel.y, describe(&outcome)))
            }
            Step::Exit => {
                let Some(gesture) = self.gesture.take() else {
                    return Err(ScenarioError::NoActiveDrag {
                        step,
                        action: action.name(),
                    }
                    .into());
                };
                self.preview = None;
                self.layout.on_drag_exit();
                if let Some(id) = gesture.session.dragged() {
                    self.layout.on_drop_completed(id)?;
                }
                Ok("exit".to_string())
            }
            Step::Resize {
                item,
                cell,
                span,
                direction,
                commit,
            } => {
                self.ensure_idle(step)?;
                let id = ItemId(*item);
                let direction = direction
                    .map(|[dx, dy]| Direction::new(dx, dy))
                    .unwrap_or(Direction::RIGHT);
                let cell = CellPos::new(cell[0], cell[1]);
                let span = CellSpan::new(span[0], span[1]);
                let before: Vec<(ItemId, CellAndSpan)> = self
                    .layout
                    .items()
                    .iter()
                    .map(|i| (i.id(), i.committed()))
                    .collect();
                let resized = self
                    .layout
                    .create_area_for_resize(id, cell, span, direction, *commit)?;
                for (id, current) in self.layout.take_dirty_items() {
                    if let Some((_, previous)) = before.iter().find(|(b, _)| *b == id) {
                        self.changes.push(ItemChange {
                            id,
                            previous: *previous,
                            current,
                        });
                    }
                }
                let result = if resized { "ok" } else { "no room" };
                Ok(format!(
                    "resize {} to {} -> {}",
                    id,
                    CellAndSpan::at(cell, span),
                    result
                ))
            }
            Step::Remove { item } => {
                self.ensure_idle(step)?;
                let id = ItemId(*item);
                self.layout.remove_item(id).map_err(|err| match err {
                    LayoutError::UnknownItem(id) => RunError::from(ScenarioError::UnknownItem { step, id }),
                    other => RunError::from(other),
                })?;
                Ok(format!("remove {}", id))
            }
        }
    }

    fn ensure_idle(&self, step: usize) -> Result<(), ScenarioError> {
        if self.gesture.is_some() {
            Err(ScenarioError::DragInProgress { step })
        } else {
            Ok(())
        }
    }

    fn incoming_id(&self) -> Option<ItemId> {
        self.gesture
            .as_ref()
            .and_then(|g| g.incoming.as_ref())
            .map(|i| i.id())
    }

    /// Pixel a hover or drop aims at: an explicit pixel, or the center of the
    /// dragged span placed at `cell`
    fn target(
        &self,
        step: usize,
        action: &Step,
        cell: Option<[i32; 2]>,
        pixel: Option<[i32; 2]>,
    ) -> Result<PixelPoint, ScenarioError> {
        let gesture = self.gesture.as_ref().ok_or(ScenarioError::NoActiveDrag {
            step,
            action: action.name(),
        })?;
        match (pixel, cell) {
            (Some([x, y]), _) => Ok(PixelPoint::new(x, y)),
            (None, Some([x, y])) => Ok(self.layout.metrics().region_to_center_point(
                x,
                y,
                gesture.span.x,
                gesture.span.y,
            )),
            (None, None) => Err(ScenarioError::MissingTarget {
                step,
                action: action.name(),
            }),
        }
    }

    fn create_area(
        &mut self,
        step: usize,
        action: &Step,
        pixel: PixelPoint,
        mode: DropMode,
    ) -> Result<DropOutcome, ScenarioError> {
        let gesture = self.gesture.as_mut().ok_or(ScenarioError::NoActiveDrag {
            step,
            action: action.name(),
        })?;
        Ok(self.layout.create_area(
            &mut gesture.session,
            pixel,
            gesture.min_span,
            gesture.span,
            mode,
        ))
    }
}

fn describe(outcome: &DropOutcome) -> String {
    match outcome.placement {
        Some(placement) => placement.to_string(),
        None => "no room".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ICONS: &str = r#"
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
kind = { type = "folder" }
"#;

    #[test]
    fn test_parse_items_and_defaults() {
        let scenario = Scenario::from_str(TWO_ICONS).unwrap();
        assert_eq!(scenario.grid.count_x, 3);
        assert_eq!(scenario.grid.icon_size, 64);
        assert_eq!(scenario.items.len(), 2);
        assert_eq!(scenario.items[0].kind, ItemKind::Shortcut);
        assert_eq!(scenario.items[1].kind, ItemKind::Folder);
        assert!(scenario.steps.is_empty());
    }

    #[test]
    fn test_parse_steps() {
        let source = r#"
[[steps]]
action = "pick_up"
item = 3

[[steps]]
action = "hover"
cell = [1, 2]

[[steps]]
action = "exit"

[[steps]]
action = "resize"
item = 3
cell = [0, 0]
span = [2, 1]
"#;
        let scenario = Scenario::from_str(source).unwrap();
        assert_eq!(scenario.steps.len(), 4);
        assert!(matches!(scenario.steps[0], Step::PickUp { item: 3 }));
        assert!(matches!(
            scenario.steps[1],
            Step::Hover {
                cell: Some([1, 2]),
                pixel: None
            }
        ));
        assert!(matches!(scenario.steps[2], Step::Exit));
        assert!(matches!(scenario.steps[3], Step::Resize { commit: true, .. }));
    }

    #[test]
    fn test_widget_span_from_kind() {
        let spec = ItemSpec {
            id: 5,
            cell: [0, 0],
            kind: ItemKind::Widget {
                min_width: 150,
                min_height: 80,
                min_resize_width: None,
                min_resize_height: None,
            },
            span: None,
            fixed: false,
        };
        let metrics = GridConfig::new().metrics();
        let item = spec.to_item(&metrics);
        assert_eq!(item.committed().span(), CellSpan::new(2, 1));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Scenario::from_str("[grid\ncount_x = 4");
        assert!(matches!(result, Err(ScenarioError::ParseError(_))));
    }

    #[test]
    fn test_hover_without_drag_is_rejected() {
        let source = format!("{}\n[[steps]]\naction = \"hover\"\ncell = [0, 0]\n", TWO_ICONS);
        let scenario = Scenario::from_str(&source).unwrap();
        let err = scenario.replay(false).unwrap_err();
        assert!(matches!(
            err,
            RunError::Scenario(ScenarioError::NoActiveDrag { step: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_pick_up() {
        let source = format!("{}\n[[steps]]\naction = \"pick_up\"\nitem = 9\n", TWO_ICONS);
        let scenario = Scenario::from_str(&source).unwrap();
        let err = scenario.replay(false).unwrap_err();
        assert_eq!(err.to_string(), "scenario error: step 1: item #9 is not on the grid");
    }

    #[test]
    fn test_replay_internal_move() {
        let source = format!(
            "{}\n[[steps]]\naction = \"pick_up\"\nitem = 1\n\n[[steps]]\naction = \"drop\"\ncell = [2, 0]\n",
            TWO_ICONS
        );
        let report = Scenario::from_str(&source).unwrap().replay(false).unwrap();
        assert_eq!(report.initial, "1 2 .");
        assert_eq!(report.final_grid(), ". 2 1");
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.frames[1].label, "drop (250, 50) -> (2, 0) 1x1");
    }

    #[test]
    fn test_introduce_existing_id_is_rejected() {
        let source = format!(
            "{}\n[[steps]]\naction = \"introduce\"\nid = 2\n\n[[steps]]\naction = \"drop\"\ncell = [2, 0]\n",
            TWO_ICONS
        );
        let err = Scenario::from_str(&source).unwrap().replay(false).unwrap_err();
        assert!(matches!(
            err,
            RunError::Scenario(ScenarioError::DuplicateItem { step: 1, id: ItemId(2) })
        ));
        assert_eq!(err.to_string(), "scenario error: step 1: item #2 is already on the grid");
    }

    #[test]
    fn test_report_with_rejected_items_clones() {
        let source = format!("{}\n[[items]]\nid = 3\ncell = [1, 0]\n", TWO_ICONS);
        let report = Scenario::from_str(&source).unwrap().replay(false).unwrap();
        assert_eq!(
            report.rejected,
            vec![LayoutError::Overlap {
                id: ItemId(3),
                placement: CellAndSpan::new(1, 0, 1, 1),
            }]
        );

        let copy = report.clone();
        assert_eq!(copy, report);
    }
}
