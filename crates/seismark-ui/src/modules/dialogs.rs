// crates/seismark-ui/src/modules/dialogs.rs
//
// Filter and trigger configuration windows, the discard confirmation and the
// message modal. Parameter input is validated here; a rejected form stays open
// with the error underneath and nothing is sent.

use egui::{Id, RichText, Ui};

use seismark_core::commands::SessionCommand;
use seismark_core::params::{FilterKind, FilterParams, TriggerParams};

use super::{FrameView, SessionModule};
use crate::theme::{DARK_TEXT_DIM, REVIEW_BANNER};

#[derive(Clone, Debug, PartialEq)]
pub struct FilterForm {
    pub kind:   FilterKind,
    pub min:    String,
    pub max:    String,
    pub offset: String,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self { kind: FilterKind::Bandpass, min: String::new(), max: String::new(), offset: String::new() }
    }
}

impl FilterForm {
    pub fn from_params(params: Option<&FilterParams>) -> Self {
        let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        match params {
            Some(p) => Self {
                kind:   p.kind,
                min:    num(p.min_freq),
                max:    num(p.max_freq),
                offset: p.offset_seconds.to_string(),
            },
            None => Self::default(),
        }
    }

    pub fn parse(&self) -> Result<FilterParams, String> {
        FilterParams::from_inputs(self.kind, &self.min, &self.max, &self.offset).map_err(|e| e.to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerForm {
    pub sta:       String,
    pub lta:       String,
    pub threshold: String,
}

impl TriggerForm {
    pub fn from_params(params: Option<&TriggerParams>) -> Self {
        match params {
            Some(p) => Self {
                sta:       p.sta_seconds.to_string(),
                lta:       p.lta_seconds.to_string(),
                threshold: p.threshold.to_string(),
            },
            None => Self::default(),
        }
    }

    pub fn parse(&self) -> Result<TriggerParams, String> {
        TriggerParams::from_inputs(&self.sta, &self.lta, &self.threshold).map_err(|e| e.to_string())
    }
}

#[derive(Default)]
pub struct DialogsModule {
    filter_open:   bool,
    filter:        FilterForm,
    filter_error:  Option<String>,
    trigger_open:  bool,
    trigger:       TriggerForm,
    trigger_error: Option<String>,
}

fn field(ui: &mut Ui, label: &str, text: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(text).desired_width(90.0));
    ui.end_row();
}

impl DialogsModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_filter(&mut self, current: Option<&FilterParams>) {
        self.filter       = FilterForm::from_params(current);
        self.filter_error = None;
        self.filter_open  = true;
    }

    pub fn open_trigger(&mut self, current: Option<&TriggerParams>) {
        self.trigger       = TriggerForm::from_params(current);
        self.trigger_error = None;
        self.trigger_open  = true;
    }

    pub fn close_all(&mut self) {
        self.filter_open  = false;
        self.trigger_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.filter_open || self.trigger_open
    }

    fn filter_window(&mut self, ctx: &egui::Context, cmd: &mut Vec<SessionCommand>) {
        let mut open = self.filter_open;
        let mut submitted = false;
        egui::Window::new("Filter Configuration")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("filter_form").num_columns(2).show(ui, |ui| {
                    ui.label("Filter:");
                    egui::ComboBox::from_id_salt("filter_kind")
                        .selected_text(self.filter.kind.label())
                        .show_ui(ui, |ui| {
                            for kind in FilterKind::ALL {
                                ui.selectable_value(&mut self.filter.kind, kind, kind.label());
                            }
                        });
                    ui.end_row();
                    field(ui, "Min Freq (Hz):", &mut self.filter.min);
                    field(ui, "Max Freq (Hz):", &mut self.filter.max);
                    field(ui, "Offset (s):", &mut self.filter.offset);
                });
                if let Some(err) = &self.filter_error {
                    ui.label(RichText::new(err).color(REVIEW_BANNER));
                }
                ui.label(RichText::new("Blank offset = 0").size(10.0).color(DARK_TEXT_DIM));
                submitted = ui.button("Apply Filter").clicked();
            });

        if submitted {
            match self.filter.parse() {
                Ok(params) => {
                    cmd.push(SessionCommand::ApplyFilter(params));
                    open = false;
                }
                Err(e) => self.filter_error = Some(e),
            }
        }
        self.filter_open = open;
    }

    fn trigger_window(&mut self, ctx: &egui::Context, cmd: &mut Vec<SessionCommand>) {
        let mut open = self.trigger_open;
        let mut submitted = false;
        egui::Window::new("Trigger Configuration")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("STA/LTA Trigger:");
                egui::Grid::new("trigger_form").num_columns(2).show(ui, |ui| {
                    field(ui, "STA (s):", &mut self.trigger.sta);
                    field(ui, "LTA (s):", &mut self.trigger.lta);
                    field(ui, "Threshold:", &mut self.trigger.threshold);
                });
                if let Some(err) = &self.trigger_error {
                    ui.label(RichText::new(err).color(REVIEW_BANNER));
                }
                submitted = ui.button("Apply Trigger").clicked();
            });

        if submitted {
            match self.trigger.parse() {
                Ok(params) => {
                    cmd.push(SessionCommand::ApplyTrigger(params));
                    open = false;
                }
                Err(e) => self.trigger_error = Some(e),
            }
        }
        self.trigger_open = open;
    }
}

impl SessionModule for DialogsModule {
    fn name(&self) -> &str { "Dialogs" }

    fn ui(&mut self, ui: &mut Ui, view: &FrameView<'_>, cmd: &mut Vec<SessionCommand>) {
        let ctx = ui.ctx().clone();
        if self.filter_open {
            self.filter_window(&ctx, cmd);
        }
        if self.trigger_open {
            self.trigger_window(&ctx, cmd);
        }

        if let Some(text) = &view.modes.message {
            let resp = egui::Modal::new(Id::new("message_modal")).show(&ctx, |ui| {
                ui.set_max_width(360.0);
                ui.label(text.as_str());
                ui.add_space(8.0);
                ui.button("OK").clicked()
            });
            if resp.inner || resp.should_close() {
                cmd.push(SessionCommand::DismissMessage);
            }
        } else if view.modes.confirm_discard {
            let key = view.state.active_group.as_deref().unwrap_or_default();
            let resp = egui::Modal::new(Id::new("confirm_discard")).show(&ctx, |ui| {
                ui.label(format!("Are you sure to mark as removed trace: {key}?"));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        Some(true)
                    } else if ui.button("No").clicked() {
                        Some(false)
                    } else {
                        None
                    }
                })
                .inner
            });
            match resp.inner {
                Some(true) => cmd.push(SessionCommand::ConfirmDiscard),
                Some(false) => cmd.push(SessionCommand::DismissMessage),
                None if resp.should_close() => cmd.push(SessionCommand::DismissMessage),
                None => {}
            }
        }
    }
}
