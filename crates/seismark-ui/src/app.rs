// src/app.rs (seismark-ui)
use std::path::PathBuf;

use eframe::egui;
use rfd::FileDialog;
use tracing::info;

use seismark_core::commands::SessionCommand;
use seismark_core::markers::CommitOutcome;
use seismark_core::navigation::{Direction, NavOutcome};
use seismark_core::state::{Preferences, SessionState};
use seismark_media::{Workbench, WorkbenchError};

use crate::context::AppContext;
use crate::modules::{
    dialogs::DialogsModule, plot::PlotModule, toolbar::ToolbarModule, trace_list::TraceListModule,
    FrameView, SessionModule,
};
use crate::theme::{configure_style, DARK_TEXT_DIM};

// ── App ───────────────────────────────────────────────────────────────────────

pub struct SeisMarkApp {
    context:      AppContext,
    trace_list:   TraceListModule,
    plot:         PlotModule,
    toolbar:      ToolbarModule,
    dialogs:      DialogsModule,
    /// Commands emitted by modules each frame, processed after the UI pass
    pending_cmds: Vec<SessionCommand>,
}

impl SeisMarkApp {
    /// `folder` (from the command line) wins over the last folder in the
    /// stored preferences.
    pub fn new(cc: &eframe::CreationContext<'_>, folder: Option<PathBuf>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let prefs = cc
            .storage
            .and_then(|s| eframe::get_value::<Preferences>(s, eframe::APP_KEY))
            .unwrap_or_default();
        let state = SessionState::from_preferences(&prefs);

        let mut app = Self {
            context:      AppContext::new(Workbench::new(state)),
            trace_list:   TraceListModule::new(),
            plot:         PlotModule::new(),
            toolbar:      ToolbarModule,
            dialogs:      DialogsModule::new(),
            pending_cmds: Vec::new(),
        };

        let startup = folder.or(prefs.last_folder.filter(|p| p.is_dir()));
        if let Some(folder) = startup {
            app.process_command(SessionCommand::OpenFolder(folder));
        }
        app
    }

    /// Errors go to the message modal; the session carries on.
    fn run<T>(&mut self, result: Result<T, WorkbenchError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.context.report(e);
                None
            }
        }
    }

    fn on_nav(&mut self, outcome: NavOutcome) {
        if let NavOutcome::Boundary(b) = outcome {
            self.context.inform(b.message());
        }
    }

    fn process_command(&mut self, cmd: SessionCommand) {
        let wb = &mut self.context.workbench;
        match cmd {
            // ── Folder ───────────────────────────────────────────────────────
            SessionCommand::PickFolder => {
                let mut dialog = FileDialog::new();
                if let Some(dir) = wb.folder() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(dir) = dialog.pick_folder() {
                    self.process_command(SessionCommand::OpenFolder(dir));
                }
            }
            SessionCommand::OpenFolder(dir) => {
                let result = wb.open_folder(&dir);
                if let Some(report) = self.run(result) {
                    if let Some(from) = report.migrated_from {
                        let backup = report.backup.map(|b| b.display().to_string()).unwrap_or_default();
                        self.context.inform(format!(
                            "data.csv was upgraded from layout {from:?}.\nThe previous file was kept as {backup}"
                        ));
                    }
                }
            }
            SessionCommand::Rescan => {
                let result = wb.rescan();
                self.run(result);
            }
            SessionCommand::SetScanMode(mode) => {
                let result = wb.set_scan_mode(mode);
                self.run(result);
            }

            // ── Trace list ───────────────────────────────────────────────────
            SessionCommand::SelectGroup(key) => {
                let result = wb.select(&key);
                self.run(result);
            }
            SessionCommand::Navigate(direction) => {
                let result = wb.navigate(direction);
                if let Some(outcome) = self.run(result) {
                    self.on_nav(outcome);
                }
            }
            SessionCommand::SetFilterSelection(selection) => {
                let result = wb.set_filter_selection(selection);
                self.run(result);
            }
            SessionCommand::Reload => {
                let result = wb.reload();
                if self.run(result).is_some() {
                    self.context.workbench.set_status("Plot reloaded");
                }
            }

            // ── Signal transforms ────────────────────────────────────────────
            SessionCommand::ApplyFilter(params) => {
                let result = wb.apply_filter(params);
                self.run(result);
            }
            SessionCommand::ToggleFilter => {
                let result = wb.toggle_filter();
                if let Some(on) = self.run(result) {
                    self.context.workbench.set_status(if on { "Filter on" } else { "Filter off" });
                }
            }
            SessionCommand::ApplyTrigger(params) => {
                let result = wb.apply_trigger(params);
                if let Some(proposed) = self.run(result) {
                    let status = match proposed {
                        Some(t) => format!("Trigger proposed an arrival at {t:.2} s"),
                        None    => "Trigger found no onset".to_string(),
                    };
                    self.context.workbench.set_status(status);
                }
            }
            SessionCommand::ToggleTrigger => {
                let result = wb.toggle_trigger();
                self.run(result);
            }

            // ── Marks ────────────────────────────────────────────────────────
            SessionCommand::AddMark(time) => {
                let result = wb.add_mark(time);
                self.run(result);
            }
            SessionCommand::MoveMark { id, time_seconds } => {
                wb.move_mark(id, time_seconds);
            }
            SessionCommand::SelectMark(id) => {
                wb.select_mark(id);
            }
            SessionCommand::DeleteSelectedMark => {
                wb.delete_selected_mark();
            }
            SessionCommand::Commit => {
                let key = wb.state().active_group.clone().unwrap_or_default();
                let result = wb.commit();
                match self.run(result) {
                    Some(CommitOutcome::Committed(_)) => {
                        self.context.workbench.set_status(format!("P-wave time for {key} saved"));
                    }
                    Some(CommitOutcome::NothingToCommit) => {
                        self.context.workbench.set_status("No marks to commit");
                    }
                    None => {}
                }
            }
            SessionCommand::CommitAndAdvance => {
                let result = wb.commit_and_advance();
                if let Some((_, nav)) = self.run(result) {
                    self.on_nav(nav);
                }
            }
            SessionCommand::ClearMarks => {
                let result = wb.clear_marks();
                self.run(result);
            }

            // ── Triage ───────────────────────────────────────────────────────
            SessionCommand::ToggleReview => {
                let result = wb.toggle_review();
                self.run(result);
            }
            SessionCommand::RequestDiscard => {
                if wb.display().is_some() {
                    self.context.modes.confirm_discard = true;
                }
            }
            SessionCommand::ConfirmDiscard => {
                self.context.modes.confirm_discard = false;
                let result = wb.discard_active();
                self.run(result);
            }

            // ── View / UI ────────────────────────────────────────────────────
            SessionCommand::ResetView => {
                self.plot.reset_view();
            }
            SessionCommand::ToggleZoomMode => {
                self.context.modes.zoom_mode = !self.context.modes.zoom_mode;
            }
            SessionCommand::OpenFilterDialog => {
                self.dialogs.open_filter(wb.state().filter_params.as_ref());
            }
            SessionCommand::OpenTriggerDialog => {
                self.dialogs.open_trigger(wb.state().trigger_params.as_ref());
            }
            SessionCommand::ClearModes => {
                wb.deselect_marks();
                self.context.modes.clear();
                self.dialogs.close_all();
            }
            SessionCommand::DismissMessage => {
                self.context.modes.dismiss();
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.context.modes.is_modal_open() {
            return;
        }
        let bindings: [(&[egui::Key], SessionCommand); 11] = [
            (&[egui::Key::ArrowLeft, egui::Key::ArrowUp],    SessionCommand::Navigate(Direction::Previous)),
            (&[egui::Key::ArrowRight, egui::Key::ArrowDown], SessionCommand::Navigate(Direction::Next)),
            (&[egui::Key::F],      SessionCommand::ToggleFilter),
            (&[egui::Key::Escape], SessionCommand::ClearModes),
            (&[egui::Key::R],      SessionCommand::Reload),
            (&[egui::Key::T],      SessionCommand::ToggleReview),
            (&[egui::Key::Z],      SessionCommand::ToggleZoomMode),
            (&[egui::Key::P],      SessionCommand::AddMark(None)),
            (&[egui::Key::Space],  SessionCommand::CommitAndAdvance),
            (&[egui::Key::D],      SessionCommand::RequestDiscard),
            (&[egui::Key::Delete, egui::Key::Backspace], SessionCommand::DeleteSelectedMark),
        ];
        let has_folder = self.context.workbench.state().folder.is_some();
        for (keys, cmd) in bindings {
            let pressed = ctx.input(|i| keys.iter().any(|k| i.key_pressed(*k)));
            let global = matches!(cmd, SessionCommand::ClearModes | SessionCommand::ToggleZoomMode);
            if pressed && (has_folder || global) {
                self.pending_cmds.push(cmd);
            }
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let folder = dropped
            .into_iter()
            .filter_map(|f| f.path)
            .find_map(|p| if p.is_dir() { Some(p) } else { p.parent().map(PathBuf::from) });
        if let Some(folder) = folder {
            info!("[app] dropped {}", folder.display());
            self.pending_cmds.push(SessionCommand::OpenFolder(folder));
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for SeisMarkApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let prefs = Preferences::capture(self.context.workbench.state());
        eframe::set_value(storage, eframe::APP_KEY, &prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.handle_keys(ctx);
        self.context.textures.sync(ctx, self.context.workbench.display());

        let view = FrameView {
            state:       self.context.workbench.state(),
            display:     self.context.workbench.display(),
            spectrogram: self.context.textures.spectrogram(),
            modes:       &self.context.modes,
        };

        egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| {
            ui.add_space(3.0);
            self.toolbar.ui(ui, &view, &mut self.pending_cmds);
            ui.add_space(1.0);
        });

        egui::TopBottomPanel::bottom("status_panel")
            .exact_height(22.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let text = view.state.status.as_deref().unwrap_or("");
                    ui.label(egui::RichText::new(text).size(11.0).color(DARK_TEXT_DIM));
                });
            });

        egui::SidePanel::left("trace_panel")
            .resizable(true)
            .default_width(240.0)
            .min_width(180.0)
            .show(ctx, |ui| {
                self.trace_list.ui(ui, &view, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot.ui(ui, &view, &mut self.pending_cmds);
            self.dialogs.ui(ui, &view, &mut self.pending_cmds);
        });

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<SessionCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }
    }
}
