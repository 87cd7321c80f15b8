//! English relative-time formatting ("3 minutes ago", "in 2 days").

use chrono::{DateTime, Utc};
use record_types::RelativeTime;

/// Seconds -> minutes -> hours -> days -> weeks -> months -> years.
const STEPS: [f64; 6] = [60.0, 60.0, 24.0, 7.0, 365.0 / 7.0 / 12.0, 12.0];

/// `[past, future]` per unit; even rows are the singular/"now" forms.
const EN: [[&str; 2]; 14] = [
    ["just now", "right now"],
    ["%s seconds ago", "in %s seconds"],
    ["1 minute ago", "in 1 minute"],
    ["%s minutes ago", "in %s minutes"],
    ["1 hour ago", "in 1 hour"],
    ["%s hours ago", "in %s hours"],
    ["1 day ago", "in 1 day"],
    ["%s days ago", "in %s days"],
    ["1 week ago", "in 1 week"],
    ["%s weeks ago", "in %s weeks"],
    ["1 month ago", "in 1 month"],
    ["%s months ago", "in %s months"],
    ["1 year ago", "in 1 year"],
    ["%s years ago", "in %s years"],
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeAgo;

impl TimeAgo {
    pub fn new() -> Self {
        Self
    }
}

impl RelativeTime for TimeAgo {
    fn format(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let secs = (now - at).num_seconds();
        let tense = usize::from(secs < 0);
        let mut value = secs.unsigned_abs() as f64;
        let mut unit = 0;
        while unit < STEPS.len() && value >= STEPS[unit] {
            value /= STEPS[unit];
            unit += 1;
        }
        let n = value as u64;
        let mut row = unit * 2;
        // under ten seconds reads as "just now"
        let plural_from = if unit == 0 { 9 } else { 1 };
        if n > plural_from {
            row += 1;
        }
        EN[row][tense].replace("%s", &n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(secs: i64) -> String {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        TimeAgo.format(now - Duration::seconds(secs), now)
    }

    #[test]
    fn past_units() {
        assert_eq!(ago(0), "just now");
        assert_eq!(ago(9), "just now");
        assert_eq!(ago(30), "30 seconds ago");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(150), "2 minutes ago");
        assert_eq!(ago(3 * 3600), "3 hours ago");
        assert_eq!(ago(3 * 86_400), "3 days ago");
        assert_eq!(ago(8 * 86_400), "1 week ago");
        assert_eq!(ago(400 * 86_400), "1 year ago");
    }

    #[test]
    fn future_units() {
        assert_eq!(ago(-5), "right now");
        assert_eq!(ago(-7 * 3600), "in 7 hours");
        assert_eq!(ago(-3600), "in 1 hour");
    }
}
