use chrono::{DateTime, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Recurrence cadence of a preventive-maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
    CustomDays,
    CustomWeeks,
    CustomMonths,
    CustomYears,
    OnDemand,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "DAILY",
            PeriodType::Weekly => "WEEKLY",
            PeriodType::Monthly => "MONTHLY",
            PeriodType::Quarterly => "QUARTERLY",
            PeriodType::SemiAnnually => "SEMI_ANNUALLY",
            PeriodType::Annually => "ANNUALLY",
            PeriodType::CustomDays => "CUSTOM_DAYS",
            PeriodType::CustomWeeks => "CUSTOM_WEEKS",
            PeriodType::CustomMonths => "CUSTOM_MONTHS",
            PeriodType::CustomYears => "CUSTOM_YEARS",
            PeriodType::OnDemand => "ON_DEMAND",
        }
    }

    /// All tags with a short description, for CLI help output.
    pub fn variants() -> [(&'static str, &'static str); 11] {
        [
            ("DAILY", "every N days"),
            ("WEEKLY", "every N weeks"),
            ("MONTHLY", "every N months"),
            ("QUARTERLY", "every N quarters (3N months)"),
            ("SEMI_ANNUALLY", "every N half-years (6N months)"),
            ("ANNUALLY", "every N years"),
            ("CUSTOM_DAYS", "alias of DAILY"),
            ("CUSTOM_WEEKS", "alias of WEEKLY"),
            ("CUSTOM_MONTHS", "alias of MONTHLY"),
            ("CUSTOM_YEARS", "alias of ANNUALLY"),
            ("ON_DEMAND", "no cadence, triggered manually"),
        ]
    }

    /// On-demand tasks have no calendar cadence.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, PeriodType::OnDemand)
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodTypeError {
    input: String,
}

impl fmt::Display for ParsePeriodTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period type '{}'", self.input)
    }
}

impl std::error::Error for ParsePeriodTypeError {}

impl FromStr for PeriodType {
    type Err = ParsePeriodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DAILY" => Ok(PeriodType::Daily),
            "WEEKLY" => Ok(PeriodType::Weekly),
            "MONTHLY" => Ok(PeriodType::Monthly),
            "QUARTERLY" => Ok(PeriodType::Quarterly),
            "SEMI_ANNUALLY" => Ok(PeriodType::SemiAnnually),
            "ANNUALLY" => Ok(PeriodType::Annually),
            "CUSTOM_DAYS" => Ok(PeriodType::CustomDays),
            "CUSTOM_WEEKS" => Ok(PeriodType::CustomWeeks),
            "CUSTOM_MONTHS" => Ok(PeriodType::CustomMonths),
            "CUSTOM_YEARS" => Ok(PeriodType::CustomYears),
            "ON_DEMAND" => Ok(PeriodType::OnDemand),
            other => Err(ParsePeriodTypeError {
                input: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    InvalidBaseDate(String),
    UnknownPeriodType(String),
    NonPositivePeriodValue(i64),
    DateOutOfRange { base: NaiveDate },
}

impl fmt::Display for RecurrenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceError::InvalidBaseDate(input) => {
                write!(f, "invalid base date '{input}'")
            }
            RecurrenceError::UnknownPeriodType(input) => {
                write!(f, "unknown period type '{input}'")
            }
            RecurrenceError::NonPositivePeriodValue(value) => {
                write!(f, "period value {value} must be positive")
            }
            RecurrenceError::DateOutOfRange { base } => {
                write!(f, "advancing {base} left the supported date range")
            }
        }
    }
}

impl std::error::Error for RecurrenceError {}

/// Advance `base` by `period_value` units of `period_type`.
///
/// Total and panic-free: a non-positive value, an on-demand cadence, or an
/// out-of-range result all return `base` unchanged. Month-based units use
/// chrono's end-of-month clamping (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn next_occurrence(base: NaiveDate, period_type: PeriodType, period_value: i64) -> NaiveDate {
    checked_next_occurrence(base, period_type, period_value).unwrap_or(base)
}

fn checked_next_occurrence(
    base: NaiveDate,
    period_type: PeriodType,
    period_value: i64,
) -> Option<NaiveDate> {
    if period_value <= 0 {
        return None;
    }
    let value = u32::try_from(period_value).ok()?;

    match period_type {
        PeriodType::Daily | PeriodType::CustomDays => {
            base.checked_add_days(Days::new(u64::from(value)))
        }
        PeriodType::Weekly | PeriodType::CustomWeeks => u64::from(value)
            .checked_mul(7)
            .and_then(|days| base.checked_add_days(Days::new(days))),
        PeriodType::Monthly | PeriodType::CustomMonths => {
            base.checked_add_months(Months::new(value))
        }
        PeriodType::Quarterly => value
            .checked_mul(3)
            .and_then(|months| base.checked_add_months(Months::new(months))),
        PeriodType::SemiAnnually => value
            .checked_mul(6)
            .and_then(|months| base.checked_add_months(Months::new(months))),
        PeriodType::Annually | PeriodType::CustomYears => value
            .checked_mul(12)
            .and_then(|months| base.checked_add_months(Months::new(months))),
        PeriodType::OnDemand => None,
    }
}

/// Parse a date-only ISO string, tolerating an RFC 3339 datetime whose
/// time-of-day is dropped. Anything unparseable substitutes the current
/// system date.
pub fn parse_base_date(input: &str) -> NaiveDate {
    try_parse_base_date(input).unwrap_or_else(|_| Local::now().date_naive())
}

fn try_parse_base_date(input: &str) -> Result<NaiveDate, RecurrenceError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .ok_or_else(|| RecurrenceError::InvalidBaseDate(input.to_string()))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Next occurrence of a recurring task, as a date-only ISO string.
///
/// Never fails: an unparseable base date substitutes today, an unknown
/// period-type tag or a non-positive period value returns the base date
/// unchanged. Callers that need to distinguish those fallbacks from a
/// computed result should use [`try_next_date`].
pub fn compute_next_date(base_date: &str, period_type: &str, period_value: i64) -> String {
    let base = parse_base_date(base_date);
    let next = match period_type.parse::<PeriodType>() {
        Ok(period) => next_occurrence(base, period, period_value),
        Err(_) => base,
    };
    format_iso(next)
}

/// Strict sibling of [`compute_next_date`]: every degraded input becomes an
/// error instead of a silent fallback. `ON_DEMAND` is still a defined no-op.
pub fn try_next_date(
    base_date: &str,
    period_type: &str,
    period_value: i64,
) -> Result<NaiveDate, RecurrenceError> {
    let base = try_parse_base_date(base_date)?;
    let period = period_type
        .parse::<PeriodType>()
        .map_err(|err| RecurrenceError::UnknownPeriodType(err.input))?;
    if period == PeriodType::OnDemand {
        return Ok(base);
    }
    if period_value <= 0 {
        return Err(RecurrenceError::NonPositivePeriodValue(period_value));
    }
    checked_next_occurrence(base, period, period_value)
        .ok_or(RecurrenceError::DateOutOfRange { base })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn period_type_round_trips_through_str() {
        for (tag, _) in PeriodType::variants() {
            let parsed: PeriodType = tag.parse().unwrap();
            assert_eq!(parsed.as_str(), tag);
        }
    }

    #[test]
    fn month_addition_clamps_to_end_of_month() {
        let jan31 = d(2024, 1, 31);
        assert_eq!(
            next_occurrence(jan31, PeriodType::Monthly, 1),
            d(2024, 2, 29)
        );
        assert_eq!(
            next_occurrence(d(2023, 1, 31), PeriodType::Monthly, 1),
            d(2023, 2, 28)
        );
    }

    #[test]
    fn non_positive_values_do_not_advance() {
        let base = d(2024, 6, 1);
        assert_eq!(next_occurrence(base, PeriodType::Weekly, 0), base);
        assert_eq!(next_occurrence(base, PeriodType::Weekly, -5), base);
    }
}
