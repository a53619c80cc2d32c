//! "Recently added" classification

use chrono::{DateTime, Months, Utc};

/// Length of the recently-added window
pub const RECENTLY_ADDED_MONTHS: u32 = 6;

/// The window `(now - 6 months, ..]`, computed once per aggregation pass so
/// every item in one response is judged against the same cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentlyAddedWindow {
    cutoff: DateTime<Utc>,
}

impl RecentlyAddedWindow {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let cutoff = now
            .checked_sub_months(Months::new(RECENTLY_ADDED_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Self { cutoff }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Strictly after the cutoff
    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        created_at > self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let window = RecentlyAddedWindow::ending_at(now);

        assert_eq!(window.cutoff(), Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap());
        assert!(!window.contains(window.cutoff() - Duration::seconds(1)));
        assert!(!window.contains(window.cutoff()));
        assert!(window.contains(window.cutoff() + Duration::seconds(1)));
        assert!(window.contains(now - Duration::days(1)));
    }
}
