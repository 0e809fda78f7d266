//! Draw-date arithmetic. Draws are held on the 1st and the 16th.

use chrono::{Datelike as _, NaiveDate};

use crate::models::DrawDate;

/// Draw days of a month, latest first.
pub const DRAW_DAYS: [u32; 2] = [16, 1];

fn previous_month(year_be: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year_be - 1, 12)
    } else {
        (year_be, month - 1)
    }
}

/// Draw days of `month` that have already come round by `today_day`,
/// latest first.
fn elapsed_in_month(year_be: i32, month: u32, today_day: Option<u32>) -> Vec<DrawDate> {
    DRAW_DAYS
        .into_iter()
        .filter(|&day| today_day.is_none_or(|today| day <= today))
        .filter_map(|day| DrawDate::new(day, month, year_be).ok())
        .collect()
}

/// Dates an incremental update should look at: the draws of the current
/// month that have elapsed, then both draws of the previous month in case
/// the last run missed them. Newest first.
pub fn dates_to_check(today: NaiveDate) -> Vec<DrawDate> {
    let current = DrawDate::from_gregorian(today);
    let (year_be, month) = (current.year_be(), current.month());

    let mut dates = elapsed_in_month(year_be, month, Some(today.day()));
    let (prev_year, prev_month) = previous_month(year_be, month);
    dates.extend(elapsed_in_month(prev_year, prev_month, None));
    dates
}

/// Every draw date from the latest elapsed one back to 1 January of
/// `end_year_be`, newest first. Empty if `end_year_be` is in the future.
pub fn backfill_dates(today: NaiveDate, end_year_be: i32) -> Vec<DrawDate> {
    let current = DrawDate::from_gregorian(today);
    let (mut year_be, mut month) = (current.year_be(), current.month());

    let mut dates = elapsed_in_month(year_be, month, Some(today.day()));
    loop {
        (year_be, month) = previous_month(year_be, month);
        if year_be < end_year_be {
            break;
        }
        dates.extend(elapsed_in_month(year_be, month, None));
    }
    dates.retain(|d| d.year_be() >= end_year_be);
    dates
}
