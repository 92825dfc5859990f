// crates/seismark-ui/src/context.rs
//
// AppContext owns everything that is NOT part of the persisted preferences.
// SeisMarkApp holds one of these plus the panel modules, nothing else.
//
//   AppContext
//     ├── workbench   session state, caches, the displayed group
//     ├── textures    the GPU copy of the current spectrogram
//     └── modes       transient UI modes (zoom, modals)

use std::sync::Arc;

use eframe::egui;
use seismark_core::media_types::Spectrogram;
use seismark_media::{Display, Workbench};

use crate::helpers::colormap::ColorLut;

/// Transient UI modes. Escape clears the zoom mode and the discard prompt;
/// the parameter windows are owned by DialogsModule.
#[derive(Default)]
pub struct UiModes {
    pub zoom_mode:       bool,
    pub confirm_discard: bool,
    /// Informational or error text shown in a modal until dismissed.
    pub message:         Option<String>,
}

impl UiModes {
    pub fn clear(&mut self) {
        self.zoom_mode       = false;
        self.confirm_discard = false;
    }

    /// Close the topmost modal.
    pub fn dismiss(&mut self) {
        if self.message.take().is_none() {
            self.confirm_discard = false;
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.confirm_discard || self.message.is_some()
    }
}

/// The uploaded spectrogram texture. Rebuilt only when the displayed
/// spectrogram is a different allocation from the last upload.
#[derive(Default)]
pub struct TextureCache {
    lut:         ColorLut,
    source:      Option<Arc<Spectrogram>>,
    spectrogram: Option<egui::TextureHandle>,
}

impl TextureCache {
    pub fn sync(&mut self, ctx: &egui::Context, display: Option<&Display>) {
        let Some(display) = display else {
            self.source      = None;
            self.spectrogram = None;
            return;
        };
        if self.source.as_ref().is_some_and(|s| Arc::ptr_eq(s, &display.spectrogram)) {
            return;
        }
        let image = self.lut.image(&display.spectrogram);
        self.spectrogram = Some(ctx.load_texture(
            format!("spectrogram-{}", display.group_key),
            image,
            egui::TextureOptions::LINEAR,
        ));
        self.source = Some(Arc::clone(&display.spectrogram));
    }

    pub fn spectrogram(&self) -> Option<&egui::TextureHandle> {
        self.spectrogram.as_ref()
    }
}

pub struct AppContext {
    pub workbench: Workbench,
    pub textures:  TextureCache,
    pub modes:     UiModes,
}

impl AppContext {
    pub fn new(workbench: Workbench) -> Self {
        Self { workbench, textures: TextureCache::default(), modes: UiModes::default() }
    }

    /// Route a library error into the message modal.
    pub fn report(&mut self, err: impl std::fmt::Display) {
        let text = err.to_string();
        tracing::error!("[app] {text}");
        self.modes.message = Some(text);
    }

    pub fn inform(&mut self, text: impl Into<String>) {
        self.modes.message = Some(text.into());
    }
}
