use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Wall-clock source pinned to the configured time zone.
///
/// "Today" always means the current date in this zone. The day boundary
/// follows the configured zone, never the database's idea of the date.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    tz: Tz,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_matches_now() {
        let clock = Clock::new(chrono_tz::Europe::Paris);
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
