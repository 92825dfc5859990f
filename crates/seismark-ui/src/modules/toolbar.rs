// crates/seismark-ui/src/modules/toolbar.rs
use egui::{Color32, RichText, Stroke, Ui};

use seismark_core::commands::SessionCommand;
use seismark_core::media_types::ScanMode;

use super::{FrameView, SessionModule};
use crate::theme::{ACCENT, DARK_TEXT_DIM};

/// Standard toolbar button with its shortcut in the tooltip.
fn tool_btn(ui: &mut Ui, label: &str, key: &str, enabled: bool) -> bool {
    ui.add_enabled(enabled, egui::Button::new(label).min_size(egui::vec2(0.0, 24.0)))
        .on_hover_text(key)
        .clicked()
}

/// On/off toggle, tinted while on.
fn toggle_btn(ui: &mut Ui, label: &str, key: &str, on: bool, enabled: bool) -> bool {
    let mut button = egui::Button::new(label).min_size(egui::vec2(0.0, 24.0));
    if on {
        button = button.fill(Color32::from_rgb(25, 70, 66)).stroke(Stroke::new(1.0, ACCENT));
    }
    ui.add_enabled(enabled, button).on_hover_text(key).clicked()
}

pub struct ToolbarModule;

impl SessionModule for ToolbarModule {
    fn name(&self) -> &str { "Toolbar" }

    fn ui(&mut self, ui: &mut Ui, view: &FrameView<'_>, cmd: &mut Vec<SessionCommand>) {
        let state = view.state;
        let shown = view.display.is_some();
        let has_marks = !state.markers.is_empty();

        ui.horizontal_wrapped(|ui| {
            // ── Folder ───────────────────────────────────────────────────────
            let mut mode = state.scan_mode;
            egui::ComboBox::from_id_salt("scan_mode")
                .selected_text(match mode {
                    ScanMode::EventStation   => "event/station",
                    ScanMode::FilenamePrefix => "file prefix",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut mode, ScanMode::EventStation, "event/station");
                    ui.selectable_value(&mut mode, ScanMode::FilenamePrefix, "file prefix");
                });
            if mode != state.scan_mode {
                cmd.push(SessionCommand::SetScanMode(mode));
            }
            if tool_btn(ui, "Rescan", "Re-walk the data folder", state.folder.is_some()) {
                cmd.push(SessionCommand::Rescan);
            }
            ui.separator();

            // ── View ─────────────────────────────────────────────────────────
            if tool_btn(ui, "Reset View", "Whole trace", shown) {
                cmd.push(SessionCommand::ResetView);
            }
            if tool_btn(ui, "Reload", "R", shown) {
                cmd.push(SessionCommand::Reload);
            }
            if toggle_btn(ui, "Zoom Select", "Z", view.modes.zoom_mode, shown) {
                cmd.push(SessionCommand::ToggleZoomMode);
            }
            ui.separator();

            // ── Transforms ───────────────────────────────────────────────────
            if tool_btn(ui, "Filter…", "Open Filter Configuration", true) {
                cmd.push(SessionCommand::OpenFilterDialog);
            }
            if toggle_btn(ui, "Filter", "F", state.filter_enabled, state.filter_params.is_some()) {
                cmd.push(SessionCommand::ToggleFilter);
            }
            if tool_btn(ui, "Trigger…", "Open Trigger Configuration", true) {
                cmd.push(SessionCommand::OpenTriggerDialog);
            }
            if toggle_btn(ui, "Trigger", "STA/LTA on every trace", state.trigger_enabled, state.trigger_params.is_some()) {
                cmd.push(SessionCommand::ToggleTrigger);
            }
            ui.separator();

            // ── Marks ────────────────────────────────────────────────────────
            if tool_btn(ui, "Mark P", "P", shown) {
                cmd.push(SessionCommand::AddMark(None));
            }
            if tool_btn(ui, "Delete Mark", "Delete", state.markers.selected().is_some()) {
                cmd.push(SessionCommand::DeleteSelectedMark);
            }
            if tool_btn(ui, "Clear Marks", "Save as reviewed with no arrival", shown) {
                cmd.push(SessionCommand::ClearMarks);
            }
            if tool_btn(ui, "Commit", "Space commits and moves on", shown && has_marks) {
                cmd.push(SessionCommand::Commit);
            }
            ui.separator();

            // ── Triage ───────────────────────────────────────────────────────
            if toggle_btn(ui, "Tag for Review", "T", state.is_tagged_for_review(), shown) {
                cmd.push(SessionCommand::ToggleReview);
            }
            if tool_btn(ui, "Discard", "D", shown) {
                cmd.push(SessionCommand::RequestDiscard);
            }

            if state.markers.is_dirty() {
                ui.label(RichText::new("● unsaved marks").size(10.0).color(DARK_TEXT_DIM));
            }
        });
    }
}
