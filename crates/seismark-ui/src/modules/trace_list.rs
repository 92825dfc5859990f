// crates/seismark-ui/src/modules/trace_list.rs
use egui::{Align, Layout, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use seismark_core::commands::SessionCommand;
use seismark_core::navigation::FilterSelection;

use super::{FrameView, SessionModule};
use crate::helpers::format::{fit_label, loaded_traces, tri_state_label};
use crate::theme::{ACCENT, DARK_BG_2, DARK_TEXT_DIM, MARK};

const ROW_HEIGHT: f32 = 20.0;

pub struct TraceListModule {
    /// Active group as of the last frame; a change scrolls the new row into view.
    last_active: Option<String>,
}

impl TraceListModule {
    pub fn new() -> Self {
        Self { last_active: None }
    }

    fn filter_toggles(ui: &mut Ui, selection: FilterSelection, cmd: &mut Vec<SessionCommand>) {
        ui.horizontal_wrapped(|ui| {
            let mut next = selection;
            if ui.button(tri_state_label("Review", selection.review)).on_hover_text("Needs review").clicked() {
                next.review = selection.review.cycle();
            }
            if ui.button(tri_state_label("Marked", selection.has_mark)).on_hover_text("Has an arrival mark").clicked() {
                next.has_mark = selection.has_mark.cycle();
            }
            if ui.button(tri_state_label("Discarded", selection.discarded)).on_hover_text("Soft-deleted").clicked() {
                next.discarded = selection.discarded.cycle();
            }
            if next != selection {
                cmd.push(SessionCommand::SetFilterSelection(next));
            }
        });
    }
}

impl SessionModule for TraceListModule {
    fn name(&self) -> &str { "Traces" }

    fn ui(&mut self, ui: &mut Ui, view: &FrameView<'_>, cmd: &mut Vec<SessionCommand>) {
        let state = view.state;

        egui::Frame::new()
            .fill(DARK_BG_2)
            .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Traces").size(12.0).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button(RichText::new("Load Seismic Data").size(11.0)).clicked() {
                            cmd.push(SessionCommand::PickFolder);
                        }
                    });
                });
            });

        let (visible, total) = state.loaded_counts();
        ui.label(RichText::new(loaded_traces(visible, total)).size(11.0).color(DARK_TEXT_DIM));
        Self::filter_toggles(ui, state.filter_selection, cmd);
        ui.separator();

        if state.folder.is_none() {
            ui.add_space(30.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Open a data folder\nor drop one here").size(11.0).color(DARK_TEXT_DIM));
            });
            return;
        }

        let scroll_to = match &state.active_group {
            Some(key) if self.last_active.as_ref() != Some(key) => state.visible.iter().position(|k| k == key),
            _ => None,
        };
        self.last_active = state.active_group.clone();

        let store = state.store.as_ref();
        let width = ui.available_width();
        let mut table = TableBuilder::new(ui)
            .striped(true)
            .sense(Sense::click())
            .column(Column::remainder())
            .column(Column::exact(18.0));
        if let Some(row) = scroll_to {
            table = table.scroll_to_row(row, Some(Align::Center));
        }

        table.body(|body| {
            body.rows(ROW_HEIGHT, state.visible.len(), |mut row| {
                let key = &state.visible[row.index()];
                let record = store.and_then(|s| s.get(key));
                row.set_selected(state.active_group.as_deref() == Some(key.as_str()));
                row.col(|ui| {
                    ui.label(RichText::new(fit_label(key, width - 30.0)).size(11.0).monospace());
                });
                row.col(|ui| {
                    match record {
                        Some(r) if r.needs_review => { ui.label(RichText::new("⚑").color(MARK)); }
                        Some(r) if r.has_marks()  => { ui.label(RichText::new("✔").color(ACCENT)); }
                        _ => {}
                    }
                });
                if row.response().clicked() {
                    cmd.push(SessionCommand::SelectGroup(key.clone()));
                }
            });
        });
    }
}
