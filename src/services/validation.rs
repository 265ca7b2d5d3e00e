use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::errors::ValidationError;
use crate::models::NewBooking;

static CONTACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());
// ASCII classes only: `\d` in `regex` also matches non-ASCII digits.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2})?$").unwrap());

/// Exclusive upper bound of a `DECIMAL(10,2)` column.
const AMOUNT_LIMIT: i64 = 100_000_000;

/// Body of `POST /api/bookings` and `PUT /api/bookings/{id}`. Clients send
/// numbers and strings interchangeably, so every field is kept as raw JSON
/// until validation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub customer_name: Option<Value>,
    pub contact_number: Option<Value>,
    pub event_date: Option<Value>,
    pub event_time: Option<Value>,
    pub branch: Option<Value>,
    pub selected_package: Option<Value>,
    pub amount: Option<Value>,
    pub celebration_type: Option<Value>,
}

/// Contact rule; dates, times and amounts are checked by parsing them.
#[derive(Debug, Validate)]
struct ContactForm {
    #[validate(custom(function = "validate_contact_number"))]
    contact_number: String,
}

fn text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_event_date(value: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_RE.is_match(value) {
        return Err(ValidationError::InvalidDate);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)
}

/// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
pub fn parse_event_time(value: &str) -> Result<NaiveTime, ValidationError> {
    if !TIME_RE.is_match(value) {
        return Err(ValidationError::InvalidTime);
    }
    let hours_minutes = value.get(..5).ok_or(ValidationError::InvalidTime)?;
    NaiveTime::parse_from_str(hours_minutes, "%H:%M").map_err(|_| ValidationError::InvalidTime)
}

/// Non-negative and small enough for the `amount` column once rounded to cents.
fn parse_amount(value: &str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(value).map_err(|_| ValidationError::InvalidAmount)?;
    let stored = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if amount.is_sign_negative() || stored >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(amount)
}

fn validate_contact_number(value: &str) -> Result<(), validator::ValidationError> {
    if CONTACT_RE.is_match(value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("contact_number"))
    }
}

pub fn validate_create(payload: &BookingPayload) -> Result<NewBooking, ValidationError> {
    let fields = [
        ("customerName", text(&payload.customer_name)),
        ("contactNumber", text(&payload.contact_number)),
        ("eventDate", text(&payload.event_date)),
        ("eventTime", text(&payload.event_time)),
        ("branch", text(&payload.branch)),
        ("selectedPackage", text(&payload.selected_package)),
        ("amount", text(&payload.amount)),
        ("celebrationType", text(&payload.celebration_type)),
    ];

    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let [customer_name, contact_number, event_date, event_time, branch, selected_package, amount, celebration_type] =
        fields.map(|(_, value)| value.unwrap_or_default());

    // Order matters: contact, then date, time and amount.
    ContactForm {
        contact_number: contact_number.clone(),
    }
    .validate()
    .map_err(|_| ValidationError::InvalidContact)?;
    let event_date = parse_event_date(&event_date)?;
    let event_time = parse_event_time(&event_time)?;
    let amount = parse_amount(&amount)?;

    Ok(NewBooking {
        event_date,
        event_time,
        amount,
        customer_name,
        contact_number,
        branch,
        selected_package,
        celebration_type,
    })
}

/// Updates replace the whole row, so they follow the create rules.
pub fn validate_update(payload: &BookingPayload) -> Result<NewBooking, ValidationError> {
    validate_create(payload)
}
