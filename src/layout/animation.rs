//! Animation requests emitted while a reorder is in progress
//!
//! The layout never draws anything. It tells a [`ReorderAnimator`] where
//! items should glide to and which items should shake to hint that a drop
//! would move them. [`RecordingAnimator`] captures those requests so they
//! can be inspected.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::trace;

use super::config::GridConfig;
use super::geometry::CellMetrics;
use super::solver::ItemConfiguration;
use super::types::{CellAndSpan, CellPos, CellSpan, GridItem, ItemId};

/// A looping nudge toward the cell an item would move to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorderHint {
    /// Horizontal nudge in pixels
    pub delta_x: f32,
    /// Vertical nudge in pixels
    pub delta_y: f32,
    /// Duration of one shake cycle in milliseconds
    pub period_ms: u32,
}

impl ReorderHint {
    pub fn is_zero(&self) -> bool {
        self.delta_x == 0.0 && self.delta_y == 0.0
    }
}

/// Receiver of the animation requests a layout makes
pub trait ReorderAnimator {
    /// Glide an item to `target` over `duration_ms`
    fn animate_to_position(&mut self, id: ItemId, target: CellAndSpan, duration_ms: u32);

    /// Start shaking an item
    fn start_hint(&mut self, id: ItemId, hint: ReorderHint);

    /// Stop a shake wherever it currently is
    fn cancel_hint(&mut self, id: ItemId);

    /// Stop a shake and ease the item back to rest over `duration_ms`
    fn complete_hint(&mut self, id: ItemId, duration_ms: u32);
}

/// Animator that drops every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnimator;

impl ReorderAnimator for NullAnimator {
    fn animate_to_position(&mut self, _id: ItemId, _target: CellAndSpan, _duration_ms: u32) {}
    fn start_hint(&mut self, _id: ItemId, _hint: ReorderHint) {}
    fn cancel_hint(&mut self, _id: ItemId) {}
    fn complete_hint(&mut self, _id: ItemId, _duration_ms: u32) {}
}

/// One request received by a [`RecordingAnimator`]
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    Move {
        id: ItemId,
        target: CellAndSpan,
        duration_ms: u32,
    },
    HintStarted {
        id: ItemId,
        hint: ReorderHint,
    },
    HintCancelled {
        id: ItemId,
    },
    HintCompleted {
        id: ItemId,
        duration_ms: u32,
    },
}

impl std::fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationEvent::Move {
                id,
                target,
                duration_ms,
            } => write!(f, "move {} to {} over {}ms", id, target, duration_ms),
            AnimationEvent::HintStarted { id, hint } => write!(
                f,
                "hint {} by ({}, {})",
                id, hint.delta_x, hint.delta_y
            ),
            AnimationEvent::HintCancelled { id } => write!(f, "cancel hint {}", id),
            AnimationEvent::HintCompleted { id, duration_ms } => {
                write!(f, "settle {} over {}ms", id, duration_ms)
            }
        }
    }
}

/// Animator that records every request.
///
/// Clones share the same log, so a clone can be handed to a layout while the
/// original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimator {
    events: Rc<RefCell<Vec<AnimationEvent>>>,
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<AnimationEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return the events recorded so far
    pub fn take(&self) -> Vec<AnimationEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn push(&self, event: AnimationEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ReorderAnimator for RecordingAnimator {
    fn animate_to_position(&mut self, id: ItemId, target: CellAndSpan, duration_ms: u32) {
        self.push(AnimationEvent::Move {
            id,
            target,
            duration_ms,
        });
    }

    fn start_hint(&mut self, id: ItemId, hint: ReorderHint) {
        self.push(AnimationEvent::HintStarted { id, hint });
    }

    fn cancel_hint(&mut self, id: ItemId) {
        self.push(AnimationEvent::HintCancelled { id });
    }

    fn complete_hint(&mut self, id: ItemId, duration_ms: u32) {
        self.push(AnimationEvent::HintCompleted { id, duration_ms });
    }
}

/// Nudge for an item moving from `from` to `to`, pointing back toward where
/// it is now so the shake reads as "about to leave".
///
/// Axis-aligned moves nudge by the full `magnitude`; diagonal moves split it
/// by the angle of travel, truncated to whole pixels.
pub fn compute_hint_delta(
    metrics: &CellMetrics,
    from: CellPos,
    to: CellPos,
    span: CellSpan,
    magnitude: f32,
) -> (f32, f32) {
    let start = metrics.region_to_center_point(from.x, from.y, span.x, span.y);
    let end = metrics.region_to_center_point(to.x, to.y, span.x, span.y);
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    if dx == 0 && dy == 0 {
        (0.0, 0.0)
    } else if dy == 0 {
        (-(dx.signum() as f32) * magnitude, 0.0)
    } else if dx == 0 {
        (0.0, -(dy.signum() as f32) * magnitude)
    } else {
        let angle = ((dy as f32 / dx as f32) as f64).atan();
        let magnitude = magnitude as f64;
        let hint_x = -(dx.signum() as f64) * (angle.cos() * magnitude).abs();
        let hint_y = -(dy.signum() as f64) * (angle.sin() * magnitude).abs();
        (hint_x.trunc() as f32, hint_y.trunc() as f32)
    }
}

/// Translates solver output into animator requests and tracks live hints
pub struct AnimationBridge {
    animator: Box<dyn ReorderAnimator>,
    shaking: BTreeMap<ItemId, ReorderHint>,
    metrics: CellMetrics,
    hint_distance: f32,
    reorder_ms: u32,
    hint_ms: u32,
}

impl AnimationBridge {
    pub fn new(config: &GridConfig, animator: Box<dyn ReorderAnimator>) -> Self {
        Self {
            animator,
            shaking: BTreeMap::new(),
            metrics: config.metrics(),
            hint_distance: config.hint_distance(),
            reorder_ms: config.reorder_animation_ms,
            hint_ms: config.hint_animation_ms,
        }
    }

    /// Replace the animator; hints in flight are forgotten
    pub fn set_animator(&mut self, animator: Box<dyn ReorderAnimator>) {
        self.animator = animator;
        self.shaking.clear();
    }

    pub fn animate_to_position(&mut self, id: ItemId, target: CellAndSpan) {
        self.animator
            .animate_to_position(id, target, self.reorder_ms);
    }

    /// Start, retarget or stop the shake of every item the solution moves
    pub fn begin_or_adjust_hints(
        &mut self,
        solution: &ItemConfiguration,
        items: &[GridItem],
        drag: Option<ItemId>,
    ) {
        for item in items {
            if Some(item.id()) == drag {
                continue;
            }
            let Some(target) = solution.get(item.id()) else {
                continue;
            };
            let (delta_x, delta_y) = compute_hint_delta(
                &self.metrics,
                item.committed().cell(),
                target.cell(),
                target.span(),
                self.hint_distance,
            );
            self.animate_hint(
                item.id(),
                ReorderHint {
                    delta_x,
                    delta_y,
                    period_ms: self.hint_ms,
                },
            );
        }
    }

    fn animate_hint(&mut self, id: ItemId, hint: ReorderHint) {
        if self.shaking.remove(&id).is_some() {
            self.animator.cancel_hint(id);
            if hint.is_zero() {
                self.animator.complete_hint(id, self.reorder_ms);
                return;
            }
        }
        if hint.is_zero() {
            return;
        }
        trace!("hint {} by ({}, {})", id, hint.delta_x, hint.delta_y);
        self.animator.start_hint(id, hint);
        self.shaking.insert(id, hint);
    }

    /// Settle every shaking item back to rest
    pub fn complete_and_clear_hints(&mut self) {
        for id in std::mem::take(&mut self.shaking).into_keys() {
            self.animator.complete_hint(id, self.reorder_ms);
        }
    }

    pub fn is_shaking(&self, id: ItemId) -> bool {
        self.shaking.contains_key(&id)
    }

    pub fn shaking_count(&self) -> usize {
        self.shaking.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::ItemKind;
    use pretty_assertions::assert_eq;

    fn config() -> GridConfig {
        GridConfig {
            hint_magnitude: 0.5,
            ..GridConfig::new().with_cell_size(100, 100).with_icon_size(24)
        }
    }

    #[test]
    fn test_hint_axis_aligned() {
        let m = config().metrics();
        let (x, y) = compute_hint_delta(
            &m,
            CellPos::new(0, 0),
            CellPos::new(2, 0),
            CellSpan::unit(),
            12.0,
        );
        assert_eq!((x, y), (-12.0, 0.0));

        let (x, y) = compute_hint_delta(
            &m,
            CellPos::new(1, 3),
            CellPos::new(1, 1),
            CellSpan::unit(),
            12.0,
        );
        assert_eq!((x, y), (0.0, 12.0));
    }

    #[test]
    fn test_hint_diagonal_truncates() {
        let m = config().metrics();
        let (x, y) = compute_hint_delta(
            &m,
            CellPos::new(0, 0),
            CellPos::new(1, 1),
            CellSpan::unit(),
            12.0,
        );
        // 12 * cos(45deg) ~ 8.49
        assert_eq!((x, y), (-8.0, -8.0));
    }

    #[test]
    fn test_hint_none_when_not_moving() {
        let m = config().metrics();
        let delta = compute_hint_delta(
            &m,
            CellPos::new(2, 2),
            CellPos::new(2, 2),
            CellSpan::new(2, 1),
            12.0,
        );
        assert_eq!(delta, (0.0, 0.0));
    }

    #[test]
    fn test_bridge_restarts_and_settles_hints() {
        let recorder = RecordingAnimator::new();
        let mut bridge = AnimationBridge::new(&config(), Box::new(recorder.clone()));
        let items = vec![GridItem::new(
            ItemId(1),
            ItemKind::Shortcut,
            CellPos::new(0, 0),
            CellSpan::unit(),
        )];

        let at_rest = ItemConfiguration::from_items(&items, false);
        let moved_right = {
            let mut shifted = items.clone();
            shifted[0].set_committed(CellAndSpan::new(1, 0, 1, 1));
            ItemConfiguration::from_items(&shifted, false)
        };

        bridge.begin_or_adjust_hints(&moved_right, &items, None);
        assert!(bridge.is_shaking(ItemId(1)));

        // Same hint again: cancel then restart
        bridge.begin_or_adjust_hints(&moved_right, &items, None);
        // Back in place: cancel then settle
        bridge.begin_or_adjust_hints(&at_rest, &items, None);
        assert_eq!(bridge.shaking_count(), 0);

        let hint = ReorderHint {
            delta_x: -12.0,
            delta_y: 0.0,
            period_ms: 300,
        };
        assert_eq!(
            recorder.take(),
            vec![
                AnimationEvent::HintStarted { id: ItemId(1), hint },
                AnimationEvent::HintCancelled { id: ItemId(1) },
                AnimationEvent::HintStarted { id: ItemId(1), hint },
                AnimationEvent::HintCancelled { id: ItemId(1) },
                AnimationEvent::HintCompleted {
                    id: ItemId(1),
                    duration_ms: 150
                },
            ]
        );
    }

    #[test]
    fn test_complete_and_clear() {
        let recorder = RecordingAnimator::new();
        let mut bridge = AnimationBridge::new(&config(), Box::new(recorder.clone()));
        bridge.animate_hint(
            ItemId(4),
            ReorderHint {
                delta_x: 0.0,
                delta_y: 3.0,
                period_ms: 300,
            },
        );
        recorder.take();

        bridge.complete_and_clear_hints();
        bridge.complete_and_clear_hints();
        assert_eq!(
            recorder.events(),
            vec![AnimationEvent::HintCompleted {
                id: ItemId(4),
                duration_ms: 150
            }]
        );
    }
}
