// Hour-boundary arithmetic shared by the finalizer and the status endpoint

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// Closed-open hour interval examined by a finalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SaleWindow {
    /// The previous whole hour as of `now`: `[hour_floor(now)-1h, hour_floor(now))`.
    pub fn previous_hour(now: DateTime<Utc>) -> Self {
        let end = hour_floor(now);
        SaleWindow {
            start: end - TimeDelta::hours(1),
            end,
        }
    }
}

/// Truncates a timestamp down to the whole hour.
pub fn hour_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(TimeDelta::hours(1))
        .expect("hour truncation is valid for all in-range timestamps")
}

/// Time left until the next hour boundary; drives the finalizer timer.
pub fn until_next_hour(now: DateTime<Utc>) -> std::time::Duration {
    let next = hour_floor(now) + TimeDelta::hours(1);
    (next - now).to_std().unwrap_or(std::time::Duration::ZERO)
}

/// Whole seconds left before the next hour boundary, for the status body.
pub fn seconds_until_next_hour(now: DateTime<Utc>) -> i64 {
    (hour_floor(now) + TimeDelta::hours(1) - now).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn floor_truncates_minutes_and_seconds() {
        assert_eq!(hour_floor(at(12, 59, 59)), at(12, 0, 0));
        assert_eq!(hour_floor(at(13, 0, 0)), at(13, 0, 0));
        assert_eq!(hour_floor(at(13, 0, 1)), at(13, 0, 0));
    }

    #[test]
    fn previous_window_spans_the_last_whole_hour() {
        let window = SaleWindow::previous_hour(at(13, 0, 1));
        assert_eq!(window.start, at(12, 0, 0));
        assert_eq!(window.end, at(13, 0, 0));

        // Just before the boundary the window still covers 11:00-12:00
        let window = SaleWindow::previous_hour(at(12, 59, 59));
        assert_eq!(window.start, at(11, 0, 0));
        assert_eq!(window.end, at(12, 0, 0));
    }

    #[test]
    fn wait_until_boundary() {
        assert_eq!(until_next_hour(at(12, 59, 59)).as_secs(), 1);
        assert_eq!(until_next_hour(at(13, 0, 0)).as_secs(), 3600);
        assert_eq!(seconds_until_next_hour(at(12, 30, 0)), 1800);
        assert_eq!(seconds_until_next_hour(at(13, 0, 1)), 3599);
    }
}
