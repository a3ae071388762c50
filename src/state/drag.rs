//! Pointer drag state machine for metric chips
//!
//! Reusable and widget-independent: the UI feeds pointer events plus the
//! drop-zone hit test, the machine decides when a press becomes a drag and
//! what a release means. A release anywhere but a valid drop zone cancels
//! without touching registry state.

use egui::Pos2;

use crate::constants::drag::START_THRESHOLD;
use crate::state::plots::PlotId;

/// Current phase of the chip drag machine
#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    /// Pressed on a draggable chip but still within the movement threshold
    Armed { metric: String, from: PlotId, origin: Pos2 },
    /// Past the threshold; a floating chip clone follows the pointer
    Dragging { metric: String, from: PlotId, pos: Pos2 },
}

/// A completed drop: move `metric` from one plot to another
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub metric: String,
    pub from: PlotId,
    pub to: PlotId,
}

pub struct DragController {
    phase: DragPhase,
    threshold: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self { phase: DragPhase::Idle, threshold: START_THRESHOLD }
    }

    /// Pointer pressed on a chip. Non-draggable presses (the chip's remove
    /// button) never arm the machine.
    pub fn press(&mut self, metric: &str, from: PlotId, pos: Pos2, draggable: bool) {
        if !draggable || self.phase != DragPhase::Idle {
            return;
        }
        self.phase = DragPhase::Armed { metric: metric.to_string(), from, origin: pos };
    }

    /// Pointer moved. Arms become drags past the movement threshold.
    pub fn motion(&mut self, pos: Pos2) {
        match &mut self.phase {
            DragPhase::Armed { metric, from, origin } => {
                if (pos - *origin).length() >= self.threshold {
                    let metric = std::mem::take(metric);
                    let from = *from;
                    self.phase = DragPhase::Dragging { metric, from, pos };
                }
            }
            DragPhase::Dragging { pos: current, .. } => *current = pos,
            DragPhase::Idle => {}
        }
    }

    /// Pointer released over `target` (the hit-tested drop zone, if any).
    /// Returns the commit for a drag that ended on a valid target; everything
    /// else is a silent cancel.
    pub fn release(&mut self, target: Option<PlotId>) -> Option<DragCommit> {
        let phase = std::mem::replace(&mut self.phase, DragPhase::Idle);
        match (phase, target) {
            (DragPhase::Dragging { metric, from, .. }, Some(to)) => {
                Some(DragCommit { metric, from, to })
            }
            _ => None,
        }
    }

    /// Abort without a commit (focus loss, escape)
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// The floating clone to draw, while dragging
    pub fn dragging(&self) -> Option<(&str, Pos2)> {
        match &self.phase {
            DragPhase::Dragging { metric, pos, .. } => Some((metric.as_str(), *pos)),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    #[cfg(test)]
    fn phase(&self) -> &DragPhase {
        &self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::payload::PayloadModel;
    use crate::state::plots::PlotRegistry;

    fn ids() -> (PlotId, PlotId) {
        let mut registry = PlotRegistry::new();
        (registry.active_or_first(), registry.create_plot())
    }

    #[test]
    fn test_press_and_release_without_motion_is_not_a_drag() {
        let (a, b) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(10.0, 10.0), true);
        assert!(!drag.is_dragging());
        assert_eq!(drag.release(Some(b)), None);
        assert_eq!(*drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_small_motion_stays_armed() {
        let (a, _) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(10.0, 10.0), true);
        drag.motion(Pos2::new(12.0, 10.0));
        assert!(!drag.is_dragging());
        assert!(matches!(drag.phase(), DragPhase::Armed { .. }));
    }

    #[test]
    fn test_threshold_crossing_starts_drag_and_clone_follows() {
        let (a, _) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(10.0, 10.0), true);
        drag.motion(Pos2::new(20.0, 10.0));
        assert!(drag.is_dragging());

        drag.motion(Pos2::new(40.0, 25.0));
        let (metric, pos) = drag.dragging().unwrap();
        assert_eq!(metric, "M");
        assert_eq!(pos, Pos2::new(40.0, 25.0));
    }

    #[test]
    fn test_release_over_target_commits() {
        let (a, b) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(0.0, 0.0), true);
        drag.motion(Pos2::new(30.0, 0.0));

        let commit = drag.release(Some(b)).unwrap();
        assert_eq!(commit, DragCommit { metric: "M".to_string(), from: a, to: b });
        assert_eq!(*drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_release_outside_target_cancels() {
        let (a, _) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(0.0, 0.0), true);
        drag.motion(Pos2::new(30.0, 0.0));
        assert_eq!(drag.release(None), None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_non_draggable_press_never_arms() {
        let (a, b) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(0.0, 0.0), false);
        drag.motion(Pos2::new(50.0, 50.0));
        assert_eq!(*drag.phase(), DragPhase::Idle);
        assert_eq!(drag.release(Some(b)), None);
    }

    #[test]
    fn test_cancel_discards_state() {
        let (a, _) = ids();
        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(0.0, 0.0), true);
        drag.motion(Pos2::new(30.0, 0.0));
        drag.cancel();
        assert_eq!(*drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_commit_drives_registry_move() {
        let json = serde_json::json!({
            "metricOptions": [{ "metric": "M", "label": "m", "unit": "COUNT" }],
            "series": [{ "metric": "M", "points": [{ "date": "2024-01-01", "value": 1 }] }]
        })
        .to_string();
        let payload = PayloadModel::parse(&json).unwrap();
        let mut registry = PlotRegistry::new();
        let a = registry.active_or_first();
        let b = registry.create_plot();
        registry.add_metric_group(&payload, a, "M");

        let mut drag = DragController::new();
        drag.press("M", a, Pos2::new(0.0, 0.0), true);
        drag.motion(Pos2::new(30.0, 0.0));
        let commit = drag.release(Some(b)).unwrap();
        registry.move_metric_group(&payload, &commit.metric, commit.from, commit.to);

        assert!(!registry.plot(a).unwrap().contains_metric("M"));
        assert!(registry.plot(b).unwrap().contains_metric("M"));
    }
}
