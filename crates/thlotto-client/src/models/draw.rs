use std::fmt::Display;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

/// Offset from the Gregorian to the Buddhist-era year.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Calendar date of a draw, kept in the Buddhist era the source uses.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawDate {
    year_be: i32,
    month: u32,
    day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawDateError {
    #[error("Invalid draw date format: {0:?}")]
    InvalidFormat(String),
    #[error("Draw date {day:02}/{month:02}/{year_be} is not a calendar date")]
    NotACalendarDate { day: u32, month: u32, year_be: i32 },
}

impl DrawDate {
    pub fn new(day: u32, month: u32, year_be: i32) -> Result<Self, DrawDateError> {
        year_be
            .checked_sub(BUDDHIST_ERA_OFFSET)
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
            .map(|_| Self {
                year_be,
                month,
                day,
            })
            .ok_or(DrawDateError::NotACalendarDate {
                day,
                month,
                year_be,
            })
    }

    pub fn from_gregorian(date: NaiveDate) -> Self {
        Self {
            year_be: date.year() + BUDDHIST_ERA_OFFSET,
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_gregorian(self) -> Option<NaiveDate> {
        let year = self.year_be.checked_sub(BUDDHIST_ERA_OFFSET)?;
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }

    pub fn day(self) -> u32 {
        self.day
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn year_be(self) -> i32 {
        self.year_be
    }

    /// Request token for the source, `DDMMYYYY`.
    pub fn token(self) -> String {
        format!("{:02}{:02}{}", self.day, self.month, self.year_be)
    }

    /// Parse a `DDMMYYYY` token.
    pub fn from_token(token: &str) -> Result<Self, DrawDateError> {
        let token = token.trim();
        if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DrawDateError::InvalidFormat(token.to_owned()));
        }
        let invalid = || DrawDateError::InvalidFormat(token.to_owned());
        let day = token[0..2].parse().map_err(|_e| invalid())?;
        let month = token[2..4].parse().map_err(|_e| invalid())?;
        let year_be = token[4..8].parse().map_err(|_e| invalid())?;
        Self::new(day, month, year_be)
    }

    /// Parse the stored form `DD/MM/YYYY`. Single-digit day and month are
    /// tolerated.
    pub fn from_display(s: &str) -> Result<Self, DrawDateError> {
        let invalid = || DrawDateError::InvalidFormat(s.to_owned());
        let mut parts = s.trim().split('/');
        let (Some(day), Some(month), Some(year), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let day = day.parse().map_err(|_e| invalid())?;
        let month = month.parse().map_err(|_e| invalid())?;
        let year_be = year.parse().map_err(|_e| invalid())?;
        Self::new(day, month, year_be)
    }
}

/// Stored form, `DD/MM/YYYY`. This string is the dedup key in the dataset.
impl Display for DrawDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day, self.month, self.year_be)
    }
}

/// One category's winning numbers for one draw date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub date: String,
    pub numbers: Vec<String>,
}

impl DrawRecord {
    pub fn new(date: DrawDate, numbers: Vec<String>) -> Self {
        Self {
            date: date.to_string(),
            numbers,
        }
    }

    /// Parsed date, if the stored string is in the `DD/MM/YYYY` form.
    pub fn draw_date(&self) -> Option<DrawDate> {
        DrawDate::from_display(&self.date).ok()
    }
}
