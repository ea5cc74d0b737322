//! Text measurement and truncation for chart labels.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out: Vec<char> = Vec::new();
    for ch in text.chars() {
        out.push(ch);
        let candidate: String = out.iter().chain(std::iter::once(&'…')).collect();
        if estimate_text_width_px(&candidate, font_px) > max_px {
            out.pop();
            break;
        }
    }
    if out.is_empty() {
        return String::new();
    }
    let mut s: String = out.into_iter().collect();
    s.push('…');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Oil", 10, 100), "Oil");
    }

    #[test]
    fn long_text_gets_one_ellipsis_and_fits() {
        let s = truncate_to_width("Electricity generation and transmission", 10, 120);
        assert!(s.ends_with('…'));
        assert_eq!(s.matches('…').count(), 1);
        assert!(estimate_text_width_px(&s, 10) <= 120);
    }
}
