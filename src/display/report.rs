//! Report formatting utilities for terminal output

use rust_decimal::prelude::ToPrimitive;

use crate::models::Money;

/// Share of `part` in `whole` as a percentage, 0 when `whole` is zero
pub fn share(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.amount()
        .checked_div(whole.amount())
        .and_then(|ratio| ratio.checked_mul(rust_decimal::Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Center a title in the given width
pub fn format_header(title: &str, width: usize) -> String {
    let len = title.chars().count();
    let padding = if len >= width { 0 } else { (width - len) / 2 };
    format!("{}{}", " ".repeat(padding), title)
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Format a double separator line
pub fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

/// Truncate to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Label and value on one line, value right-aligned
pub fn labeled(label: &str, value: &str, width: usize) -> String {
    let used = label.chars().count() + value.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{}{}{}", label, " ".repeat(gap), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(78.4), "78%");
    }

    #[test]
    fn test_share() {
        let pct = share(Money::from_major(14500), Money::from_major(18500));
        assert!((pct - 78.378).abs() < 0.01);
        assert_eq!(share(Money::from_major(5), Money::zero()), 0.0);
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50.0, 100.0, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(0.0, 100.0, 4), "░░░░");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Sīmenṭ bags", 6), "Sīm...");
    }

    #[test]
    fn test_header_and_labeled() {
        assert_eq!(format_header("AB", 6), "  AB");
        assert_eq!(labeled("Total:", "$5.00", 14), "Total:   $5.00");
        assert_eq!(labeled("Long label", "value", 4), "Long label value");
    }
}
