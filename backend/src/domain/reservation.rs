//! Court reservations and the query windows used by statistics.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Validation failures for reservation payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationValidationError {
    EndNotAfterStart,
    InvalidPeriod { value: String },
    InvalidWindow { kind: String, value: String },
}

impl fmt::Display for ReservationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndNotAfterStart => write!(f, "reservation must end after it starts"),
            Self::InvalidPeriod { value } => {
                write!(f, "unknown statistics period: {value}")
            }
            Self::InvalidWindow { kind, value } => {
                write!(f, "invalid {kind} window value: {value}")
            }
        }
    }
}

impl std::error::Error for ReservationValidationError {}

/// A persisted reservation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: i64,
    pub user_id: UserId,
    pub field_id: i64,
    pub price_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub cancelled: bool,
}

impl Reservation {
    /// Whether two time ranges on the same field collide.
    ///
    /// Ranges are half-open: back-to-back bookings sharing a boundary do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> bool {
        !self.cancelled && self.starts_at < ends_at && starts_at < self.ends_at
    }
}

/// Payload for booking a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub user_id: UserId,
    pub field_id: i64,
    pub price_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
}

impl ReservationRequest {
    /// Validate and construct a booking payload.
    pub fn new(
        user_id: UserId,
        field_id: i64,
        price_id: i64,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Self, ReservationValidationError> {
        if ends_at <= starts_at {
            return Err(ReservationValidationError::EndNotAfterStart);
        }
        Ok(Self {
            user_id,
            field_id,
            price_id,
            starts_at,
            ends_at,
        })
    }
}

/// A future reservation enriched for the admin listing: client, field, and
/// price data come from joins at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub id: i64,
    pub client: String,
    pub date: NaiveDate,
    pub initial_time: String,
    pub end_time: String,
    pub field: String,
    pub price: String,
    pub cancelled: bool,
}

/// Trailing window used by the frequency statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatPeriod {
    OneWeek,
    OneMonth,
    OneYear,
}

impl StatPeriod {
    /// Parse the client-facing period literal.
    pub fn parse(raw: &str) -> Result<Self, ReservationValidationError> {
        match raw {
            "1week" => Ok(Self::OneWeek),
            "1month" => Ok(Self::OneMonth),
            "1year" => Ok(Self::OneYear),
            other => Err(ReservationValidationError::InvalidPeriod {
                value: other.to_owned(),
            }),
        }
    }

    /// Start of the trailing window that ends at `now`.
    #[must_use]
    pub fn window_start(self, now: NaiveDateTime) -> NaiveDateTime {
        let days = match self {
            Self::OneWeek => 7,
            Self::OneMonth => 30,
            Self::OneYear => 365,
        };
        now - Duration::days(days)
    }
}

/// Calendar window for the unused-fields query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    /// Exclusive end of the window.
    pub end: NaiveDate,
}

impl CalendarWindow {
    /// Parse a `day`/`month`/`year` window from its path segments.
    ///
    /// Accepted values: `day`/`YYYY-MM-DD`, `month`/`YYYY-MM`, `year`/`YYYY`.
    pub fn parse(kind: &str, value: &str) -> Result<Self, ReservationValidationError> {
        let invalid = || ReservationValidationError::InvalidWindow {
            kind: kind.to_owned(),
            value: value.to_owned(),
        };
        match kind {
            "day" => {
                let start = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
                let end = start.succ_opt().ok_or_else(invalid)?;
                Ok(Self { start, end })
            }
            "month" => {
                let start =
                    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
                        .map_err(|_| invalid())?;
                let end = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                }
                .ok_or_else(invalid)?;
                Ok(Self { start, end })
            }
            "year" => {
                let year: i32 = value.parse().map_err(|_| invalid())?;
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
                let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
                Ok(Self { start, end })
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    fn reservation(starts_at: NaiveDateTime, ends_at: NaiveDateTime, cancelled: bool) -> Reservation {
        Reservation {
            id: 1,
            user_id: UserId(1),
            field_id: 2,
            price_id: 3,
            starts_at,
            ends_at,
            cancelled,
        }
    }

    #[rstest]
    fn rejects_inverted_ranges() {
        assert_eq!(
            ReservationRequest::new(UserId(1), 2, 3, at(10, 12), at(10, 10)).expect_err("inverted"),
            ReservationValidationError::EndNotAfterStart
        );
        assert!(ReservationRequest::new(UserId(1), 2, 3, at(10, 10), at(10, 12)).is_ok());
    }

    #[rstest]
    #[case(at(10, 10), at(10, 12), true)]
    #[case(at(10, 11), at(10, 13), true)]
    #[case(at(10, 12), at(10, 14), false)]
    #[case(at(10, 8), at(10, 10), false)]
    fn overlap_is_half_open(
        #[case] starts_at: NaiveDateTime,
        #[case] ends_at: NaiveDateTime,
        #[case] expected: bool,
    ) {
        let existing = reservation(at(10, 10), at(10, 12), false);
        assert_eq!(existing.overlaps(starts_at, ends_at), expected);
    }

    #[rstest]
    fn cancelled_reservations_never_collide() {
        let existing = reservation(at(10, 10), at(10, 12), true);
        assert!(!existing.overlaps(at(10, 10), at(10, 12)));
    }

    #[rstest]
    #[case("1week", 7)]
    #[case("1month", 30)]
    #[case("1year", 365)]
    fn period_literals_map_to_trailing_days(#[case] raw: &str, #[case] days: i64) {
        let period = StatPeriod::parse(raw).expect("known period");
        let now = at(20, 12);
        assert_eq!(period.window_start(now), now - Duration::days(days));
    }

    #[rstest]
    fn unknown_period_is_rejected() {
        assert!(matches!(
            StatPeriod::parse("fortnight"),
            Err(ReservationValidationError::InvalidPeriod { .. })
        ));
    }

    #[rstest]
    fn parses_day_month_and_year_windows() {
        let day = CalendarWindow::parse("day", "2024-03-15").expect("day window");
        assert_eq!(day.end, NaiveDate::from_ymd_opt(2024, 3, 16).expect("date"));

        let month = CalendarWindow::parse("month", "2024-12").expect("month window");
        assert_eq!(month.start, NaiveDate::from_ymd_opt(2024, 12, 1).expect("date"));
        assert_eq!(month.end, NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"));

        let year = CalendarWindow::parse("year", "2024").expect("year window");
        assert_eq!(year.start, NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"));
        assert_eq!(year.end, NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"));
    }

    #[rstest]
    #[case("week", "2024-01-01")]
    #[case("day", "15-03-2024")]
    #[case("month", "2024")]
    #[case("year", "24")]
    fn rejects_malformed_windows(#[case] kind: &str, #[case] value: &str) {
        assert!(matches!(
            CalendarWindow::parse(kind, value),
            Err(ReservationValidationError::InvalidWindow { .. })
        ));
    }
}
