//! Display formatting shared by the case viewer and the CLI

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{DocStatus, Role, User};

const PESO: char = '₱';

/// Format an amount as Philippine pesos, e.g. `₱12,500.00`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}{}.{}", if negative { "-" } else { "" }, PESO, grouped, fraction)
}

/// Missing amounts render as zero
pub fn format_optional_currency(amount: Option<Decimal>) -> String {
    format_currency(amount.unwrap_or(Decimal::ZERO))
}

/// `First M. Last`, collapsing the gap when there is no middle name
pub fn person_name(user: &User) -> String {
    let middle = user
        .user_mname
        .as_deref()
        .and_then(|m| m.chars().next())
        .map(|c| format!("{}.", c))
        .unwrap_or_default();

    [
        user.user_fname.as_deref().unwrap_or(""),
        middle.as_str(),
        user.user_lname.as_deref().unwrap_or(""),
    ]
    .iter()
    .filter(|part| !part.trim().is_empty())
    .map(|part| part.trim())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Name with the attorney title, which staff members do not carry
pub fn titled_name(user: &User) -> String {
    match user.user_role {
        Some(Role::Staff) => person_name(user),
        _ => format!("Atty. {}", person_name(user)),
    }
}

pub fn doc_status_label(status: Option<&DocStatus>) -> &str {
    match status {
        Some(DocStatus::Todo) => "to do",
        Some(DocStatus::InProgress) => "in progress",
        Some(other) => other.as_str(),
        None => "-",
    }
}

/// Render a backend timestamp like `January 5, 2024, 3:07 PM` in `tz`.
/// Unparseable input is returned unchanged.
pub fn format_date_time_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    const LAYOUT: &str = "%B %-d, %Y, %-I:%M %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(tz).format(LAYOUT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive.format(LAYOUT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }
    raw.to_string()
}

pub fn format_date_time(raw: &str) -> String {
    format_date_time_in(raw, &chrono::Local)
}
