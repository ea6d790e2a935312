//! Reduction of a sub-daily forecast timeline to one sample per day.

use chrono::{NaiveDate, Timelike};
use tracing::debug;

use crate::model::{ForecastEntry, ForecastSet};

/// Hour of the sample picked to represent each day (12:00:00 local time).
pub const REPRESENTATIVE_HOUR: u32 = 12;

/// Keep the samples taken exactly at local noon, in timeline order.
///
/// A day without a noon sample is left out. A noon sample that does not move
/// past the last kept date is dropped, so the result is strictly ascending.
pub fn daily_at_noon<I>(timeline: I) -> ForecastSet
where
    I: IntoIterator<Item = ForecastEntry>,
{
    let mut last_date: Option<NaiveDate> = None;
    let mut total = 0usize;

    let daily: ForecastSet = timeline
        .into_iter()
        .inspect(|_| total += 1)
        .filter(|entry| is_noon(entry))
        .filter(|entry| {
            let date = entry.date();
            match last_date {
                Some(prev) if date <= prev => {
                    debug!(%date, %prev, "dropping out-of-order noon sample");
                    false
                }
                _ => {
                    last_date = Some(date);
                    true
                }
            }
        })
        .collect();

    debug!(samples = total, days = daily.len(), "derived daily forecast");
    daily
}

fn is_noon(entry: &ForecastEntry) -> bool {
    let time = entry.timestamp.time();
    time.hour() == REPRESENTATIVE_HOUR
        && time.minute() == 0
        && time.second() == 0
        && time.nanosecond() == 0
}
