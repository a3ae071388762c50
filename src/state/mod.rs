//! Application state management
//!
//! The dashboard's single authoritative model: payload snapshot, plot
//! registry, drag machine, and range selection. Everything the widgets show
//! is a projection of this state.

mod drag;
mod plots;
mod range;

pub use drag::{DragCommit, DragController, DragPhase};
pub use plots::{BoxAggregate, ChartSeries, Plot, PlotId, PlotRegistry, SeriesId, SeriesStyle};
pub use range::{RangePreset, RangeSelection, RangeState};

use chrono::NaiveDate;

use crate::data::payload::PayloadModel;

/// Main application state container
pub struct AppState {
    /// Current payload snapshot, replaced wholesale on every range refresh
    pub payload: PayloadModel,

    /// Live plots and their metric bindings
    pub plots: PlotRegistry,

    /// Chip drag machine
    pub drag: DragController,

    /// Range selection and fetch bookkeeping
    pub range: RangeState,

    /// Error banner content, if any
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            payload: PayloadModel::empty(),
            plots: PlotRegistry::new(),
            drag: DragController::new(),
            range: RangeState::new(today),
            error_message: None,
        }
    }

    /// Set an error message
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Clear the current error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }
}
