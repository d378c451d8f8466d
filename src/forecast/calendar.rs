//! Month-end calendar arithmetic for monthly forecast indexes.

use chrono::{Datelike, NaiveDate};

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    first_of_month(y, m).pred_opt().unwrap_or(date)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// The first `periods` month-end dates strictly after `last`.
///
/// A history ending mid-month gets that month's end as its first future date;
/// one ending on a month-end continues with the following month.
pub fn month_ends_after(last: NaiveDate, periods: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(periods);
    let mut current = month_end(last);
    if current == last {
        current = next_month_end(current);
    }
    while out.len() < periods {
        out.push(current);
        current = next_month_end(current);
    }
    out
}

fn next_month_end(month_end_date: NaiveDate) -> NaiveDate {
    match month_end_date.succ_opt() {
        Some(first) => month_end(first),
        None => month_end_date,
    }
}

/// Days since 1970-01-01.
pub fn days_since_epoch(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

/// Inverse of [`days_since_epoch`], rounding to the nearest day.
pub fn date_from_epoch_days(days: f64) -> Option<NaiveDate> {
    let days = days.round();
    if !days.is_finite() || days.abs() > f64::from(i32::MAX / 2) {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(days as i32 + UNIX_EPOCH_DAYS_FROM_CE)
}

/// True when every date is a month-end exactly one month after its predecessor.
pub fn is_contiguous_monthly(dates: &[NaiveDate]) -> bool {
    use itertools::Itertools;
    dates.iter().all(|d| month_end(*d) == *d)
        && dates
            .iter()
            .tuple_windows()
            .all(|(a, b)| next_month_end(*a) == *b)
}
