//! Layout calculations and text utilities for the TUI.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculate the display width of text (accounting for Unicode).
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate text to a maximum display width.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Truncate a string to max width, ending in "..." when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if display_width(s) <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return truncate_to_width(s, max_len);
    }
    let truncated = truncate_to_width(s, max_len.saturating_sub(3));
    format!("{truncated}...")
}

/// Pad text to a specific width with given alignment, truncating if longer.
pub fn pad_to_width(text: &str, width: usize, alignment: Alignment) -> String {
    let trimmed = truncate_to_width(text, width);
    let pad = width.saturating_sub(display_width(&trimmed));
    match alignment {
        Alignment::Left => format!("{}{}", trimmed, " ".repeat(pad)),
        Alignment::Right => format!("{}{}", " ".repeat(pad), trimmed),
        Alignment::Center => {
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), trimmed, " ".repeat(pad - left))
        }
    }
}

/// Fit a Line to a maximum width by truncating spans.
pub fn fit_line_to_width(line: Line<'_>, max_width: usize) -> Line<'_> {
    if max_width == 0 {
        return Line::from(Vec::<Span>::new());
    }

    let Line {
        spans,
        alignment,
        style,
    } = line;
    let mut out = Vec::with_capacity(spans.len());
    let mut used = 0usize;

    for span in spans {
        let span_width = display_width(span.content.as_ref());
        if used + span_width <= max_width {
            used += span_width;
            out.push(span);
        } else {
            let truncated = truncate_to_width(span.content.as_ref(), max_width - used);
            if !truncated.is_empty() {
                out.push(Span::styled(truncated, span.style));
            }
            break;
        }
    }

    Line {
        spans: out,
        alignment,
        style,
    }
}

/// Greedy word wrap by display width. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut used = 0;
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            loop {
                let word_width = display_width(&word);
                let sep = usize::from(used > 0);
                if used + sep + word_width <= width {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.push_str(&word);
                    used += sep + word_width;
                    break;
                }
                if used > 0 {
                    lines.push(std::mem::take(&mut current));
                    used = 0;
                    continue;
                }
                let mut head = truncate_to_width(&word, width);
                if head.is_empty() {
                    head = word.chars().take(1).collect();
                }
                word = word[head.len()..].to_string();
                lines.push(head);
                if word.is_empty() {
                    break;
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Calculate a centered popup rectangle within a container.
pub fn popup_rect(
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
    r: Rect,
) -> Rect {
    let max_width = r.width.saturating_sub(2).max(1);
    let max_height = r.height.saturating_sub(2).max(1);

    let target_width = (r.width.saturating_mul(percent_x) / 100).max(min_width);
    let target_height = (r.height.saturating_mul(percent_y) / 100).max(min_height);

    let width = target_width.min(max_width);
    let height = target_height.min(max_height);

    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Fixed-size centered rectangle, clamped to the container.
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truncate_str_adds_dots() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a longer title", 8), "a lon...");
        assert_eq!(truncate_str("abcdef", 3), "abc");
    }

    #[test]
    fn pad_to_width_aligns() {
        assert_eq!(pad_to_width("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(pad_to_width("ab", 4, Alignment::Right), "  ab");
        assert_eq!(pad_to_width("ab", 5, Alignment::Center), " ab  ");
        assert_eq!(pad_to_width("abcdef", 3, Alignment::Left), "abc");
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn fit_line_cuts_last_span() {
        let line = Line::from(vec![Span::raw("abc"), Span::raw("defg")]);
        let fitted = fit_line_to_width(line, 5);
        let text: String = fitted.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "abcde");
    }

    #[test]
    fn popup_rect_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_rect(50, 50, 10, 5, area);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));

        let tiny = popup_rect(50, 50, 80, 30, Rect::new(0, 0, 20, 10));
        assert_eq!(tiny.width, 18);
        assert_eq!(tiny.height, 8);
    }
}
