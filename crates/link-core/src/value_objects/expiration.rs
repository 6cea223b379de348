//! Expiration arithmetic for short links
//!
//! Custom durations are bounded with a day-count approximation
//! (`years*365 + months*30 + days` plus fractional hours and minutes),
//! while the resulting timestamp is produced with calendar addition.
//! Presets use calendar addition for months and years as well.
//!
//! Calendar addition never clamps to month end: a day-of-month past the
//! end of the target month rolls into the next one, so Jan 31 plus one
//! month is Mar 3 (Mar 2 in a leap year).

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Upper bound (exclusive) on a custom expiration, in days
pub const MAX_EXPIRATION_DAYS: i64 = 1825;

/// Months added when neither a preset nor a custom duration is given
const DEFAULT_EXPIRATION_MONTHS: u32 = 60;

// =============================================================================
// Presets
// =============================================================================

/// Named expiration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirationPreset {
    OneHour,
    TwelveHours,
    OneDay,
    SevenDays,
    OneMonth,
    SixMonths,
    OneYear,
}

impl ExpirationPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1hour",
            Self::TwelveHours => "12hours",
            Self::OneDay => "1day",
            Self::SevenDays => "7days",
            Self::OneMonth => "1month",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
        }
    }

    /// Parse an optional preset, treating `""` and `"default"` as absent
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, DomainError> {
        match raw {
            "" | "default" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    fn apply(self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::OneHour => reference.checked_add_signed(Duration::hours(1)),
            Self::TwelveHours => reference.checked_add_signed(Duration::hours(12)),
            Self::OneDay => add_calendar(reference, 0, 1),
            Self::SevenDays => add_calendar(reference, 0, 7),
            Self::OneMonth => add_calendar(reference, 1, 0),
            Self::SixMonths => add_calendar(reference, 6, 0),
            Self::OneYear => add_calendar(reference, 12, 0),
        }
    }
}

impl FromStr for ExpirationPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1hour" => Ok(Self::OneHour),
            "12hours" => Ok(Self::TwelveHours),
            "1day" => Ok(Self::OneDay),
            "7days" => Ok(Self::SevenDays),
            "1month" => Ok(Self::OneMonth),
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            other => Err(DomainError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for ExpirationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Custom durations
// =============================================================================

/// Custom expiration as submitted by clients: each field is a decimal string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomExpiration {
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub months: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub minutes: String,
}

impl CustomExpiration {
    pub fn new(years: u32, months: u32, days: u32, hours: u32, minutes: u32) -> Self {
        Self {
            years: years.to_string(),
            months: months.to_string(),
            days: days.to_string(),
            hours: hours.to_string(),
            minutes: minutes.to_string(),
        }
    }
}

/// Parsed and range-checked custom duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DurationParts {
    years: u32,
    months: u32,
    days: u32,
    hours: u32,
    minutes: u32,
}

fn parse_field(raw: &str, field: &'static str, max: u32) -> Result<u32, DomainError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v <= max)
        .ok_or(DomainError::FieldOutOfRange { field, min: 0, max })
}

impl TryFrom<&CustomExpiration> for DurationParts {
    type Error = DomainError;

    fn try_from(custom: &CustomExpiration) -> Result<Self, Self::Error> {
        Ok(Self {
            years: parse_field(&custom.years, "years", 4)?,
            months: parse_field(&custom.months, "months", 11)?,
            days: parse_field(&custom.days, "days", 30)?,
            hours: parse_field(&custom.hours, "hours", 23)?,
            minutes: parse_field(&custom.minutes, "minutes", 59)?,
        })
    }
}

impl DurationParts {
    fn approximate_days(&self) -> f64 {
        f64::from(self.years * 365 + self.months * 30 + self.days)
            + f64::from(self.hours) / 24.0
            + f64::from(self.minutes) / (24.0 * 60.0)
    }

    fn apply(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        add_calendar(reference, self.years * 12 + self.months, self.days)?
            .checked_add_signed(Duration::hours(i64::from(self.hours)))?
            .checked_add_signed(Duration::minutes(i64::from(self.minutes)))
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Add whole months and days to `reference`, keeping the time of day.
///
/// Months move the year and month first with the day-of-month kept as is;
/// the day-of-month plus `days` is then counted forward from the first of
/// that month, so any overflow lands in the following month.
fn add_calendar(reference: DateTime<Utc>, months: u32, days: u32) -> Option<DateTime<Utc>> {
    let naive = reference.naive_utc();
    let date = naive.date();

    let total_months = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;

    let offset = u64::from(date.day() - 1) + u64::from(days);
    let target = NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(offset))?;

    Some(target.and_time(naive.time()).and_utc())
}

/// Expiration inputs for create and update requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpirationRequest {
    pub preset: Option<ExpirationPreset>,
    pub custom: Option<CustomExpiration>,
}

impl ExpirationRequest {
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && self.custom.is_none()
    }
}

/// Compute the expiry timestamp for a link created or updated at `reference`.
///
/// A custom duration wins over a preset, and a preset wins over the
/// five-year default.
pub fn compute_expiration(
    request: &ExpirationRequest,
    reference: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    let expires_at = if let Some(custom) = &request.custom {
        let parts = DurationParts::try_from(custom)?;

        if parts.approximate_days() >= MAX_EXPIRATION_DAYS as f64 {
            return Err(DomainError::ExpirationOutOfBounds);
        }

        parts
            .apply(reference)
            .ok_or(DomainError::ExpirationOutOfBounds)?
    } else if let Some(preset) = request.preset {
        preset
            .apply(reference)
            .ok_or(DomainError::ExpirationOutOfBounds)?
    } else {
        add_calendar(reference, DEFAULT_EXPIRATION_MONTHS, 0)
            .ok_or(DomainError::ExpirationOutOfBounds)?
    };

    if expires_at <= reference {
        return Err(DomainError::ExpirationNotInFuture);
    }

    Ok(expires_at)
}
