//! Presentation helpers for product cards.

use crate::types::{Price, Volume};

/// Ellipsis appended to truncated descriptions.
pub const ELLIPSIS: char = '…';

/// Default description length on product cards.
pub const DEFAULT_DESCRIPTION_CHARS: usize = 120;

/// Cheapest volume price, or zero when there are no volumes.
#[must_use]
pub fn min_price(volumes: &[Volume]) -> Price {
    volumes.iter().map(|v| v.price).min().unwrap_or(Price::ZERO)
}

/// Shorten `text` to at most `max_chars` characters plus an ellipsis.
///
/// Text that already fits is returned unchanged. Otherwise the cut backs off
/// to the last whitespace in the kept prefix so words are not split, unless
/// the prefix is a single word. A `max_chars` of zero yields an empty string.
#[must_use]
pub fn short_description(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    let Some((cut, next)) = text.char_indices().nth(max_chars) else {
        return text.to_owned();
    };

    let hard = text.get(..cut).unwrap_or(text);
    let prefix = if next.is_whitespace() {
        hard
    } else {
        match hard.rfind(char::is_whitespace) {
            Some(boundary) => hard.get(..boundary).unwrap_or(hard),
            None => hard,
        }
    };

    let kept = match prefix.trim_end() {
        "" => hard.trim_end(),
        trimmed => trimmed,
    };

    let mut out = String::with_capacity(kept.len() + ELLIPSIS.len_utf8());
    out.push_str(kept);
    out.push(ELLIPSIS);
    out
}
