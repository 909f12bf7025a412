use time::{Date, OffsetDateTime};
use time_tz::{ToTimezone, timezones};

/// Source of "today" for request handlers.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall clock, read in the named IANA timezone.
    System { timezone: String },
    /// Always the same day.
    Fixed(Date),
}

impl Clock {
    pub fn system(timezone: impl Into<String>) -> Self {
        Self::System {
            timezone: timezone.into(),
        }
    }

    pub fn today(&self) -> Date {
        match self {
            Clock::System { timezone } => {
                let now = OffsetDateTime::now_utc();

                match timezones::get_by_name(timezone) {
                    Some(tz) => now.to_timezone(tz).date(),
                    None => now.date(),
                }
            }
            Clock::Fixed(date) => *date,
        }
    }
}
