// crates/seismark-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing SessionModule
//   2. Add `pub mod mypanel;` below
//   3. Give SeisMarkApp a field for it and call ui() from update()

pub mod dialogs;
pub mod plot;
pub mod toolbar;
pub mod trace_list;

use egui::{TextureHandle, Ui};
use seismark_core::commands::SessionCommand;
use seismark_core::state::SessionState;
use seismark_media::Display;

use crate::context::UiModes;

/// Read-only view of everything a panel may render from this frame.
pub struct FrameView<'a> {
    pub state:       &'a SessionState,
    pub display:     Option<&'a Display>,
    pub spectrogram: Option<&'a TextureHandle>,
    pub modes:       &'a UiModes,
}

/// Every panel implements this trait.
/// Modules read the frame view and emit commands; they never mutate the session.
pub trait SessionModule {
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, view: &FrameView<'_>, cmd: &mut Vec<SessionCommand>);
}
