// src/theme.rs
use egui::{Context, Color32, Stroke, Visuals, Style};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb( 70, 170, 160);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb( 33, 110, 104);
pub const ACCENT_HOVER:  Color32 = Color32::from_rgb(110, 205, 195);

pub const DARK_BG_0:     Color32 = Color32::from_rgb( 14,  14,  16);
pub const DARK_BG_1:     Color32 = Color32::from_rgb( 20,  20,  24);
pub const DARK_BG_2:     Color32 = Color32::from_rgb( 28,  28,  34);
pub const DARK_BG_3:     Color32 = Color32::from_rgb( 38,  38,  46);
pub const DARK_BG_4:     Color32 = Color32::from_rgb( 50,  50,  60);

pub const DARK_TEXT:     Color32 = Color32::from_rgb(220, 220, 230);
pub const DARK_TEXT_DIM: Color32 = Color32::from_rgb(120, 120, 138);
pub const DARK_BORDER:   Color32 = Color32::from_rgb( 55,  55,  68);

// ── Plot ─────────────────────────────────────────────────────────────────────
pub const TRACE_LINE:    Color32 = Color32::from_rgb(225, 225, 235);
pub const MARK:          Color32 = Color32::from_rgb(255,   0,   0);
pub const MARK_SELECTED: Color32 = Color32::from_rgb( 40, 110, 255);
pub const DETECTION:     Color32 = Color32::from_rgba_premultiplied(60, 50, 0, 60);
pub const REVIEW_BANNER: Color32 = Color32::from_rgb(255,  60,  60);
pub const ZOOM_BOX:      Color32 = Color32::from_rgb(255, 200,  60);

pub const MARK_WIDTH: f32 = 2.5;

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 5.0);
    style.spacing.window_margin    = egui::Margin::same(10);
    style.spacing.button_padding   = egui::vec2(8.0, 4.0);
    style.spacing.scroll.bar_width = 8.0;

    let cr = egui::CornerRadius::same(3);

    let mut v = Visuals::dark();
    v.panel_fill       = DARK_BG_1;
    v.window_fill      = DARK_BG_2;
    v.faint_bg_color   = DARK_BG_2;
    v.extreme_bg_color = DARK_BG_0;
    v.window_stroke    = Stroke::new(1.0, DARK_BORDER);

    v.selection.bg_fill = ACCENT_DIM;
    v.selection.stroke  = Stroke::new(1.0, DARK_TEXT);

    v.widgets.inactive.bg_fill       = DARK_BG_3;
    v.widgets.inactive.bg_stroke     = Stroke::new(1.0, DARK_BORDER);
    v.widgets.inactive.corner_radius = cr;

    v.widgets.hovered.bg_fill        = DARK_BG_4;
    v.widgets.hovered.bg_stroke      = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.fg_stroke      = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.hovered.corner_radius  = cr;

    v.widgets.active.bg_fill         = ACCENT_DIM;
    v.widgets.active.bg_stroke       = Stroke::new(1.0, ACCENT);
    v.widgets.active.corner_radius   = cr;

    v.override_text_color = Some(DARK_TEXT);

    ctx.set_visuals(v);
    ctx.set_style(style);
}
