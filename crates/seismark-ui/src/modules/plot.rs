// crates/seismark-ui/src/modules/plot.rs
//
// Spectrogram over the vertical-component trace on one shared time axis.
// Marks are drawn across both and can be dragged on either. In zoom mode a
// horizontal drag selects the new time window.

use egui::{Align2, Color32, FontId, Id, Pos2, Rect, RichText, Sense, Shape, Stroke, Ui};
use seismark_core::commands::SessionCommand;
use seismark_core::helpers::time::format_time;
use seismark_core::media_types::Channel;
use seismark_media::Display;

use super::{FrameView, SessionModule};
use crate::helpers::format::plot_title;
use crate::theme::{
    DARK_BG_0, DARK_BORDER, DARK_TEXT_DIM, DETECTION, MARK, MARK_SELECTED, MARK_WIDTH, REVIEW_BANNER,
    TRACE_LINE, ZOOM_BOX,
};

const AXIS_HEIGHT: f32 = 18.0;
const GUTTER:      f32 = 44.0;
const HANDLE_HALF: f32 = 4.0;
/// Narrower drags are treated as a click and do not zoom.
const MIN_ZOOM_PX: f32 = 4.0;

/// Visible time window ↔ screen x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeAxis {
    pub t0:    f64,
    pub t1:    f64,
    pub left:  f32,
    pub width: f32,
}

impl TimeAxis {
    pub fn to_x(&self, t: f64) -> f32 {
        let span = (self.t1 - self.t0).max(f64::EPSILON);
        self.left + ((t - self.t0) / span) as f32 * self.width
    }

    pub fn to_t(&self, x: f32) -> f64 {
        let frac = if self.width > 0.0 { ((x - self.left) / self.width) as f64 } else { 0.0 };
        self.t0 + frac * (self.t1 - self.t0)
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t0 && t <= self.t1
    }
}

/// Sample range of `ch` inside `[t0, t1]`.
fn visible_samples(ch: &Channel, t0: f64, t1: f64) -> (usize, usize) {
    let len = ch.samples.len();
    let i0 = ((t0 * ch.sampling_rate).floor().max(0.0) as usize).min(len);
    let i1 = ((t1 * ch.sampling_rate).ceil().max(0.0) as usize + 1).min(len);
    (i0, i1.max(i0))
}

/// Min/max of each pixel column, or `None` for columns with no samples.
pub fn column_envelope(samples: &[f64], columns: usize) -> Vec<Option<(f64, f64)>> {
    if columns == 0 {
        return Vec::new();
    }
    (0..columns)
        .map(|c| {
            let a = c * samples.len() / columns;
            let b = ((c + 1) * samples.len() / columns).max(a + 1).min(samples.len());
            samples.get(a..b).filter(|s| !s.is_empty()).map(|s| {
                s.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
            })
        })
        .collect()
}

/// Placement of the spectrogram image inside a time window: `x0..x1` as
/// fractions of the window, `u0..u1` as texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageSpan {
    pub x0: f64,
    pub x1: f64,
    pub u0: f64,
    pub u1: f64,
}

/// Each column of the image is centred on its bin time and half a bin wide
/// either side. `None` when the window misses the image entirely.
pub fn spectrogram_span(times: &[f64], t0: f64, t1: f64) -> Option<ImageSpan> {
    let (&first, &last) = (times.first()?, times.last()?);
    let half = if times.len() > 1 { (last - first) / (times.len() - 1) as f64 / 2.0 } else { 0.5 };
    let (start, end) = (first - half, last + half);
    let (a, b) = (t0.max(start), t1.min(end));
    if !(t1 > t0) || !(b > a) {
        return None;
    }
    let (window, image) = (t1 - t0, end - start);
    Some(ImageSpan {
        x0: (a - t0) / window,
        x1: (b - t0) / window,
        u0: (a - start) / image,
        u1: (b - start) / image,
    })
}

fn trace_shapes(ch: &Channel, rect: Rect, axis: &TimeAxis) -> Vec<Shape> {
    let (i0, i1) = visible_samples(ch, axis.t0, axis.t1);
    let window = &ch.samples[i0..i1];
    if window.is_empty() {
        return Vec::new();
    }
    let peak = window.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let scale = if peak > 0.0 { (rect.height() * 0.45) as f64 / peak } else { 0.0 };
    let y = |v: f64| rect.center().y - (v * scale) as f32;
    let stroke = Stroke::new(1.0, TRACE_LINE);

    let columns = rect.width().max(1.0) as usize;
    if window.len() <= columns * 2 {
        let points = window
            .iter()
            .enumerate()
            .map(|(k, &v)| Pos2::new(axis.to_x((i0 + k) as f64 / ch.sampling_rate), y(v)))
            .collect();
        return vec![Shape::line(points, stroke)];
    }

    let x_start = axis.to_x(i0 as f64 / ch.sampling_rate);
    let x_end   = axis.to_x(i1 as f64 / ch.sampling_rate);
    let col_w   = (x_end - x_start) / columns as f32;
    column_envelope(window, columns)
        .into_iter()
        .enumerate()
        .filter_map(|(c, mm)| {
            let (lo, hi) = mm?;
            let x = x_start + (c as f32 + 0.5) * col_w;
            Some(Shape::line_segment([Pos2::new(x, y(hi)), Pos2::new(x, y(lo) + 0.5)], stroke))
        })
        .collect()
}

pub struct PlotModule {
    /// Group (and filter state) the current view window belongs to.
    shown:     Option<(String, bool)>,
    /// Visible time window; `None` is the whole trace.
    view:      Option<(f64, f64)>,
    zoom_from: Option<Pos2>,
}

impl PlotModule {
    pub fn new() -> Self {
        Self { shown: None, view: None, zoom_from: None }
    }

    pub fn reset_view(&mut self) {
        self.view      = None;
        self.zoom_from = None;
    }

    fn axis_for(&self, display: &Display, left: f32, width: f32) -> TimeAxis {
        let full = (0.0, display.time_base.duration_seconds.max(f64::EPSILON));
        let (t0, t1) = self.view.unwrap_or(full);
        TimeAxis { t0, t1, left, width }
    }

    fn draw_time_ticks(painter: &egui::Painter, axis: &TimeAxis, y: f32) {
        let span = axis.t1 - axis.t0;
        let raw = span / 8.0;
        let mag = 10f64.powf(raw.log10().floor());
        let step = [1.0, 2.0, 5.0, 10.0].into_iter().map(|m| m * mag).find(|s| *s >= raw).unwrap_or(raw);
        if !(step > 0.0) {
            return;
        }
        let mut t = (axis.t0 / step).ceil() * step;
        while t <= axis.t1 {
            let x = axis.to_x(t);
            painter.line_segment([Pos2::new(x, y), Pos2::new(x, y + 4.0)], Stroke::new(1.0, DARK_TEXT_DIM));
            painter.text(Pos2::new(x, y + 5.0), Align2::CENTER_TOP, format!("{t:.1}"), FontId::proportional(10.0), DARK_TEXT_DIM);
            t += step;
        }
    }

    fn draw_spectrogram(view: &FrameView<'_>, display: &Display, painter: &egui::Painter, rect: Rect, axis: &TimeAxis) {
        painter.rect_filled(rect, 0.0, Color32::BLACK);
        let span = spectrogram_span(&display.spectrogram.times, axis.t0, axis.t1);
        if let (Some(tex), Some(span)) = (view.spectrogram, span) {
            let x = |f: f64| rect.left() + f as f32 * rect.width();
            let target = Rect::from_x_y_ranges(x(span.x0)..=x(span.x1), rect.y_range());
            let uv = Rect::from_min_max(Pos2::new(span.u0 as f32, 0.0), Pos2::new(span.u1 as f32, 1.0));
            painter.image(tex.id(), target, uv, Color32::WHITE);
        }

        if let Some(&top) = display.spectrogram.freqs.last() {
            let font = FontId::proportional(10.0);
            for frac in [0.0_f32, 0.5, 1.0] {
                let y = rect.bottom() - frac * rect.height();
                painter.text(
                    Pos2::new(rect.left() - 4.0, y),
                    Align2::RIGHT_CENTER,
                    format!("{:.0}", top * frac as f64),
                    font.clone(),
                    DARK_TEXT_DIM,
                );
            }
        }
    }

    fn draw_detections(display: &Display, painter: &egui::Painter, rect: Rect, axis: &TimeAxis) {
        let Some(report) = &display.trigger else { return };
        for ch in &report.channels {
            for &(on, off) in &ch.windows {
                if off < axis.t0 || on > axis.t1 {
                    continue;
                }
                let x0 = axis.to_x(on.max(axis.t0));
                let x1 = axis.to_x(off.min(axis.t1)).max(x0 + 1.0);
                painter.rect_filled(Rect::from_x_y_ranges(x0..=x1, rect.y_range()), 0.0, DETECTION);
            }
        }
    }

    fn marks_ui(
        ui: &mut Ui,
        view: &FrameView<'_>,
        span: Rect,
        axis: &TimeAxis,
        cmd: &mut Vec<SessionCommand>,
    ) {
        let painter = ui.painter_at(span);
        for mark in view.state.markers.marks() {
            if !axis.contains(mark.time_seconds) {
                continue;
            }
            let x = axis.to_x(mark.time_seconds);
            let color = if mark.selected { MARK_SELECTED } else { MARK };
            painter.line_segment([Pos2::new(x, span.top()), Pos2::new(x, span.bottom())], Stroke::new(MARK_WIDTH, color));

            let handle = Rect::from_x_y_ranges(x - HANDLE_HALF..=x + HANDLE_HALF, span.y_range());
            let resp = ui.interact(handle, Id::new("arrival_mark").with(mark.id), Sense::click_and_drag());
            if resp.clicked() || resp.drag_started() {
                cmd.push(SessionCommand::SelectMark(mark.id));
            }
            if resp.dragged() {
                if let Some(ptr) = resp.interact_pointer_pos() {
                    cmd.push(SessionCommand::MoveMark { id: mark.id, time_seconds: axis.to_t(ptr.x) });
                }
            }
            if resp.hovered() || resp.dragged() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                resp.on_hover_text(format_time(mark.time_seconds));
            }
        }
    }

    fn zoom_ui(&mut self, ui: &mut Ui, span: Rect, axis: &TimeAxis, zoom_mode: bool) {
        let resp = ui.interact(span, Id::new("plot_zoom"), Sense::drag());
        if !zoom_mode {
            self.zoom_from = None;
            return;
        }
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        if resp.drag_started() {
            self.zoom_from = resp.interact_pointer_pos();
        }
        let (Some(from), Some(to)) = (self.zoom_from, resp.interact_pointer_pos().or(ui.ctx().pointer_latest_pos())) else {
            return;
        };
        let (x0, x1) = (from.x.min(to.x).max(span.left()), from.x.max(to.x).min(span.right()));
        if resp.dragged() {
            let sel = Rect::from_x_y_ranges(x0..=x1, span.y_range());
            ui.painter_at(span).rect_stroke(sel, 0.0, Stroke::new(1.0, ZOOM_BOX), egui::StrokeKind::Inside);
        }
        if resp.drag_stopped() {
            if x1 - x0 >= MIN_ZOOM_PX {
                self.view = Some((axis.to_t(x0), axis.to_t(x1)));
            }
            self.zoom_from = None;
        }
    }

    fn key_of(display: &Display) -> (String, bool) {
        (display.group_key.clone(), display.filtered)
    }
}

impl SessionModule for PlotModule {
    fn name(&self) -> &str { "Plot" }

    fn ui(&mut self, ui: &mut Ui, view: &FrameView<'_>, cmd: &mut Vec<SessionCommand>) {
        let Some(display) = view.display else {
            self.shown = None;
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No trace selected").color(DARK_TEXT_DIM));
            });
            return;
        };
        let key = Self::key_of(display);
        if self.shown.as_ref() != Some(&key) {
            self.reset_view();
            self.shown = Some(key);
        }

        // ── Title ────────────────────────────────────────────────────────────
        ui.horizontal(|ui| {
            let filter = view
                .state
                .filter_params
                .as_ref()
                .filter(|_| display.filtered)
                .map(|p| p.describe());
            ui.label(RichText::new(plot_title(&display.group_key, filter.as_deref())).strong());
            if view.state.is_tagged_for_review() {
                ui.label(RichText::new("Tagged for Review").color(REVIEW_BANNER).strong());
            }
            if view.modes.zoom_mode {
                ui.label(RichText::new("zoom: drag to select a window").size(10.0).color(ZOOM_BOX));
            }
        });

        // ── Layout ───────────────────────────────────────────────────────────
        let (outer, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let body = Rect::from_min_max(
            Pos2::new(outer.left() + GUTTER, outer.top()),
            Pos2::new(outer.right() - 8.0, outer.bottom() - AXIS_HEIGHT),
        );
        if body.width() <= 0.0 || body.height() <= 0.0 {
            return;
        }
        let split = body.top() + body.height() * 0.4;
        let spec_rect = Rect::from_min_max(body.min, Pos2::new(body.right(), split - 3.0));
        let wave_rect = Rect::from_min_max(Pos2::new(body.left(), split + 3.0), body.max);
        let axis = self.axis_for(display, body.left(), body.width());

        let painter = ui.painter_at(outer);
        Self::draw_spectrogram(view, display, &painter, spec_rect, &axis);

        painter.rect_filled(wave_rect, 0.0, DARK_BG_0);
        Self::draw_detections(display, &painter, wave_rect, &axis);
        if let Some(ch) = display.waveform.channels.get(display.vertical) {
            let clipped = ui.painter_at(wave_rect);
            clipped.extend(trace_shapes(ch, wave_rect, &axis));
            painter.text(
                Pos2::new(wave_rect.left() + 4.0, wave_rect.top() + 2.0),
                Align2::LEFT_TOP,
                &ch.id,
                FontId::monospace(10.0),
                DARK_TEXT_DIM,
            );
        }
        for r in [spec_rect, wave_rect] {
            painter.rect_stroke(r, 0.0, Stroke::new(1.0, DARK_BORDER), egui::StrokeKind::Outside);
        }
        Self::draw_time_ticks(&painter, &axis, body.bottom() + 1.0);

        // ── Interaction (background first so mark handles sit on top) ────────
        self.zoom_ui(ui, body, &axis, view.modes.zoom_mode);
        if !view.modes.zoom_mode {
            Self::marks_ui(ui, view, body, &axis, cmd);
        } else {
            // Still draw the marks, without handles.
            let p = ui.painter_at(body);
            for mark in view.state.markers.marks().filter(|m| axis.contains(m.time_seconds)) {
                let x = axis.to_x(mark.time_seconds);
                let color = if mark.selected { MARK_SELECTED } else { MARK };
                p.line_segment([Pos2::new(x, body.top()), Pos2::new(x, body.bottom())], Stroke::new(MARK_WIDTH, color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> TimeAxis {
        TimeAxis { t0: 10.0, t1: 20.0, left: 100.0, width: 500.0 }
    }

    #[test]
    fn axis_maps_both_ways() {
        let a = axis();
        assert_eq!(a.to_x(10.0), 100.0);
        assert_eq!(a.to_x(20.0), 600.0);
        assert!((a.to_t(350.0) - 15.0).abs() < 1e-9);
        assert!((a.to_t(a.to_x(12.34)) - 12.34).abs() < 1e-4);
    }

    #[test]
    fn window_contains_its_edges_only() {
        let a = axis();
        assert!(a.contains(10.0) && a.contains(20.0) && a.contains(15.0));
        assert!(!a.contains(9.99) && !a.contains(25.0));
    }

    #[test]
    fn spectrogram_sits_on_its_bin_times() {
        let times = [1.0, 2.0, 3.0];
        let whole = spectrogram_span(&times, 0.0, 4.0).unwrap();
        assert_eq!(whole, ImageSpan { x0: 0.125, x1: 0.875, u0: 0.0, u1: 1.0 });

        let inner = spectrogram_span(&times, 1.0, 2.0).unwrap();
        assert_eq!((inner.x0, inner.x1), (0.0, 1.0));
        assert!((inner.u0 - 0.5 / 3.0).abs() < 1e-12);
        assert!((inner.u1 - 1.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn window_outside_the_spectrogram_draws_nothing() {
        assert!(spectrogram_span(&[1.0, 2.0], 5.0, 6.0).is_none());
        assert!(spectrogram_span(&[], 0.0, 1.0).is_none());
        assert!(spectrogram_span(&[1.0, 2.0], 2.0, 2.0).is_none());
    }

    #[test]
    fn envelope_covers_every_sample() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let env = column_envelope(&samples, 10);
        assert_eq!(env.len(), 10);
        assert_eq!(env[0], Some((0.0, 9.0)));
        assert_eq!(env[9], Some((90.0, 99.0)));
        assert!(column_envelope(&samples, 0).is_empty());
    }

    #[test]
    fn visible_samples_clamp_to_channel() {
        let ch = Channel::new("XX.S..BHZ", 100.0, vec![0.0; 1000]);
        assert_eq!(visible_samples(&ch, 0.0, 10.0), (0, 1000));
        assert_eq!(visible_samples(&ch, 2.0, 3.0), (200, 301));
        assert_eq!(visible_samples(&ch, 20.0, 30.0), (1000, 1000));
    }

    #[test]
    fn reset_view_returns_to_whole_trace() {
        let mut plot = PlotModule::new();
        plot.view = Some((1.0, 2.0));
        plot.reset_view();
        assert!(plot.view.is_none());
    }
}
