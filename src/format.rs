use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};

pub const MISSING: &str = "N/A";

/// How currency amounts are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyStyle {
    /// "Rs. 123.40"; safe with the built-in Times fonts.
    #[default]
    AsciiLabel,
    /// "₹123.40"; needs a font carrying the rupee glyph.
    Glyph,
}

/// Trims `value`; missing or blank values become `fallback`.
pub fn safe_text(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn safe_text_or_na(value: Option<&str>) -> String {
    safe_text(value, MISSING)
}

/// Rounds half away from zero to two places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_currency(amount: Decimal, style: CurrencyStyle) -> String {
    let amount = round_money(amount);
    match style {
        CurrencyStyle::AsciiLabel => format!("Rs. {:.2}", amount),
        CurrencyStyle::Glyph => format!("\u{20B9}{:.2}", amount),
    }
}

/// Formats an arrival date as `d/m/yyyy`. Accepts `YYYY-MM-DD` or an RFC 3339
/// timestamp (its calendar date is used as written); anything else is "N/A".
pub fn format_arrival_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return MISSING.to_string();
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        });
    match date {
        Some(date) => date.format("%-d/%-m/%Y").to_string(),
        None => MISSING.to_string(),
    }
}

/// Generation timestamp in `tz`, e.g. "18/10/2026, 03:45 pm".
pub fn format_generated_at(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    let meridiem = local.format("%p").to_string().to_lowercase();
    format!("{} {}", local.format("%d/%m/%Y, %I:%M"), meridiem)
}

/// Display identifier: the first eight characters of `id` upper-cased, or
/// `RES` followed by the last eight digits of the epoch milliseconds.
pub fn display_identifier(id: Option<&str>, now: DateTime<Utc>) -> String {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        return id.chars().take(8).collect::<String>().to_uppercase();
    }
    let millis = now.timestamp_millis().to_string();
    let tail_start = millis.len().saturating_sub(8);
    format!("RES{}", &millis[tail_start..])
}
