//! WhatsApp order hand-off.
//!
//! There is no checkout. The cart is rendered as a plain-text order and sent
//! as a prefilled WhatsApp message to the shop's number.

use std::fmt::Write as _;

use url::Url;

use rooicell_core::{Price, ResolvedLine};

/// Shop number orders are sent to.
pub const DEFAULT_ORDER_PHONE: &str = "77471658747";

const GREETING: &str = "Здравствуйте! Хочу оформить заказ:";
const TOTAL_LABEL: &str = "Итого:";

/// Render the order text for `lines`.
///
/// ```text
/// Здравствуйте! Хочу оформить заказ:
///
/// <name> (<volume>) x <qty> = <line total> ₸
///
/// Итого: <total> ₸
/// ```
#[must_use]
pub fn order_message(lines: &[ResolvedLine<'_>], total: Price) -> String {
    let mut text = format!("{GREETING}\n\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        let _ = write!(
            text,
            "{} ({}) x {} = {}",
            line.product.name,
            line.volume.label,
            line.quantity,
            line.line_total()
        );
    }
    let _ = write!(text, "\n\n{TOTAL_LABEL} {total}");
    text
}

/// Build a `https://wa.me/<phone>?text=<message>` link.
///
/// Non-digit characters in `phone` (spaces, `+`, dashes) are dropped.
///
/// # Errors
///
/// Returns `url::ParseError` if the resulting link is not a valid URL.
pub fn order_link(phone: &str, message: &str) -> Result<Url, url::ParseError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    Url::parse(&format!(
        "https://wa.me/{digits}?text={}",
        urlencoding::encode(message)
    ))
}
