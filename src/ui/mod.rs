pub mod metric_panel;
pub mod plot;
pub mod toolbar;

pub use metric_panel::render_metric_panel;
pub use plot::render_plot_grid;
pub use toolbar::render_toolbar;
