// crates/seismark-ui/src/helpers/format.rs
//
// UI-layer string utilities that don't belong in seismark-core.
//
// Time formatting lives in seismark_core::helpers::time. This module holds
// strings that only mean something on screen.

use seismark_core::navigation::TriState;

/// Truncates `text` to fit within `max_px` using a per-character width
/// heuristic (proportional 11px ≈ 6.5 px/char). Appends "…" when truncated.
///
/// Keeps long group keys on one line in the trace list.
pub fn fit_label(text: &str, max_px: f32) -> String {
    const AVG_CHAR_PX: f32 = 6.5;
    let max_chars = (max_px / AVG_CHAR_PX).max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    text.chars().take(max_chars - 1).collect::<String>() + "…"
}

pub fn loaded_traces(visible: usize, total: usize) -> String {
    format!("Loaded Traces: {visible}/{total}")
}

/// Plot title: the group key, with the filter summary when one is applied.
pub fn plot_title(group_key: &str, filter: Option<&str>) -> String {
    match filter {
        Some(desc) => format!("{group_key} (Filtered: {desc})"),
        None       => group_key.to_string(),
    }
}

/// Label for one tri-state list filter toggle.
pub fn tri_state_label(name: &str, state: TriState) -> String {
    let mark = match state {
        TriState::Ignore       => "·",
        TriState::RequireTrue  => "✔",
        TriState::RequireFalse => "✖",
    };
    format!("{mark} {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_unchanged() {
        assert_eq!(fit_label("eq001/STA1", 200.0), "eq001/STA1");
    }

    #[test]
    fn zero_width_returns_empty() {
        assert_eq!(fit_label("eq001/STA1", 0.0), "");
    }

    #[test]
    fn truncated_text_has_ellipsis() {
        let result = fit_label("event_2021_03_14/LONGSTATION", 40.0);
        assert!(result.ends_with('…'));
        assert_eq!(result.chars().count(), 6);
    }

    #[test]
    fn counts_and_titles() {
        assert_eq!(loaded_traces(3, 10), "Loaded Traces: 3/10");
        assert_eq!(plot_title("eq001/STA1", None), "eq001/STA1");
        assert_eq!(plot_title("eq001/STA1", Some("highpass")), "eq001/STA1 (Filtered: highpass)");
    }

    #[test]
    fn tri_state_labels_differ() {
        let labels: Vec<String> = [TriState::Ignore, TriState::RequireTrue, TriState::RequireFalse]
            .into_iter()
            .map(|s| tri_state_label("Review", s))
            .collect();
        assert_eq!(labels[0], "· Review");
        assert_ne!(labels[1], labels[2]);
    }
}
