//! Business-day arithmetic for forecast dates
//!
//! A business day is Monday through Friday. Exchange holidays are not
//! modelled.

use super::error::{ForecastError, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Monday..=Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() < 5
}

/// First business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> Result<NaiveDate> {
    let mut cursor = date;
    loop {
        cursor = cursor
            .checked_add_days(Days::new(1))
            .ok_or(ForecastError::DateOverflow(cursor))?;
        if is_business_day(cursor) {
            return Ok(cursor);
        }
    }
}

/// The `n` business days following `date`, in order
pub fn business_days_after(date: NaiveDate, n: usize) -> Result<Vec<NaiveDate>> {
    let mut days = Vec::new();
    let mut cursor = date;
    for _ in 0..n {
        cursor = next_business_day(cursor)?;
        days.push(cursor);
    }
    Ok(days)
}
