//! Toolbar: quick-range buttons, the custom date form, and the fetch status
//!
//! Range changes go through the app's fetch path; the buttons only reflect
//! the current selection, they never hold state of their own.

use eframe::egui::{self, Color32, RichText};
use egui_extras::DatePickerButton;

use crate::app::InsightOxide;
use crate::state::{RangePreset, RangeSelection};

pub fn render_toolbar(app: &mut InsightOxide, _ctx: &egui::Context, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("서비스 인사이트").strong().size(16.0));
        ui.separator();

        let mut requested: Option<RangeSelection> = None;
        let today = InsightOxide::today();

        for preset in RangePreset::QUICK {
            let selected = app.state.range.selection.preset == preset;
            if ui.selectable_label(selected, preset.display_label()).clicked() && !selected {
                requested = Some(RangeSelection::preset(preset, today));
            }
        }

        ui.separator();

        // Custom range form
        let custom_active = app.state.range.selection.preset == RangePreset::Custom;
        ui.label(if custom_active {
            RichText::new(RangePreset::Custom.display_label()).strong()
        } else {
            RichText::new(RangePreset::Custom.display_label())
        });
        ui.add(
            DatePickerButton::new(&mut app.state.range.custom_start)
                .id_salt("range-start")
                .show_icon(false),
        );
        ui.label("~");
        ui.add(
            DatePickerButton::new(&mut app.state.range.custom_end)
                .id_salt("range-end")
                .show_icon(false),
        );
        if ui.button("적용").clicked() {
            requested = Some(RangeSelection::custom(
                app.state.range.custom_start,
                app.state.range.custom_end,
                today,
            ));
        }

        if let Some(selection) = requested {
            app.begin_range_fetch(selection);
        }

        if app.state.range.is_fetching() {
            ui.spinner();
            ui.weak("불러오는 중…");
        }
    });

    if let Some(message) = app.state.error_message.clone() {
        ui.horizontal(|ui| {
            ui.colored_label(Color32::from_rgb(220, 38, 38), format!("⚠ {message}"));
            if ui.small_button("닫기").clicked() {
                app.state.clear_error();
            }
        });
    }
}
