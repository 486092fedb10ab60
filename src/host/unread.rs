use super::{ElementRef, HostPage, Selector};

/// Computed font-weight at or above this value reads as "unread" styling.
pub const BOLD_WEIGHT_THRESHOLD: u32 = 600;

type UnreadSignal = fn(&dyn HostPage, ElementRef) -> Option<bool>;

/// Unread signals in precedence order. Each tier either yields a verdict or
/// abstains; the first verdict wins and later tiers are never consulted.
const SIGNALS: &[UnreadSignal] = &[
    explicit_row_class,
    aria_label_mentions_unread,
    bold_font_weight,
];

/// Tiered unread detection for one row. No signal at all reads as "read".
pub fn detect_unread(host: &dyn HostPage, row: ElementRef) -> bool {
    SIGNALS
        .iter()
        .find_map(|signal| signal(host, row))
        .unwrap_or(false)
}

fn explicit_row_class(host: &dyn HostPage, row: ElementRef) -> Option<bool> {
    if host.matches(row, Selector::UnreadRow) {
        Some(true)
    } else if host.matches(row, Selector::ReadRow) {
        Some(false)
    } else {
        None
    }
}

fn aria_label_mentions_unread(host: &dyn HostPage, row: ElementRef) -> Option<bool> {
    let label = host.attribute(row, "aria-label")?;
    if label.to_lowercase().contains("unread") {
        Some(true)
    } else {
        None
    }
}

fn bold_font_weight(host: &dyn HostPage, row: ElementRef) -> Option<bool> {
    let weight = host.computed_style(row, "font-weight")?;
    let weight = weight.trim().parse::<u32>().ok()?;
    Some(weight >= BOLD_WEIGHT_THRESHOLD)
}
