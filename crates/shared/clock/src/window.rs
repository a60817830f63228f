use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tempo_core::Timestamp;

/// Configured times of day for a session, in the exchange's local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTimes {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub entry: NaiveTime,
    pub exit: NaiveTime,
}

/// The day's trading boundaries as absolute instants
///
/// Built once per session and never mutated. No ordering between the four
/// instants is enforced here; an entry or exit outside `[start, end)` simply
/// never triggers because trading is not armed at that time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    session_date: NaiveDate,
    start: Timestamp,
    end: Timestamp,
    entry: Timestamp,
    exit: Timestamp,
}

impl TradingWindow {
    /// Combine the session date with the configured times of day.
    /// `offset` is the exchange's offset from UTC.
    pub fn new(session_date: NaiveDate, times: &WindowTimes, offset: FixedOffset) -> Self {
        let at = |time: NaiveTime| -> Timestamp {
            let local = session_date.and_time(time);
            let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        };

        Self {
            session_date,
            start: at(times.start),
            end: at(times.end),
            entry: at(times.entry),
            exit: at(times.exit),
        }
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn entry(&self) -> Timestamp {
        self.entry
    }

    pub fn exit(&self) -> Timestamp {
        self.exit
    }

    /// One hour before the end of the window
    pub fn pre_warning(&self) -> Timestamp {
        self.end - Duration::hours(1)
    }

    pub fn is_before_start(&self, t: Timestamp) -> bool {
        t < self.start
    }

    /// `start <= t < end`
    pub fn is_within_window(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }

    pub fn is_at_or_after_end(&self, t: Timestamp) -> bool {
        t >= self.end
    }

    pub fn is_entry_due(&self, t: Timestamp) -> bool {
        t >= self.entry
    }

    pub fn is_exit_due(&self, t: Timestamp) -> bool {
        t >= self.exit
    }
}

impl std::fmt::Display for TradingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} start={} entry={} exit={} end={}",
            self.session_date,
            self.start.format("%H:%M:%S"),
            self.entry.format("%H:%M:%S"),
            self.exit.format("%H:%M:%S"),
            self.end.format("%H:%M:%S")
        )
    }
}
