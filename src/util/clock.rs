use chrono::{Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Server-local calendar date, the key under which a day's challenge,
/// leaderboard, and play flags are shared.
pub fn today_local() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// The calendar day immediately preceding `date`, or `None` when `date`
/// does not parse as `YYYY-MM-DD`.
pub fn day_before(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .and_then(|d| d.pred_opt())
        .map(|d| d.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn day_before_handles_month_and_year_boundaries() {
        assert_eq!(day_before("2025-03-01").as_deref(), Some("2025-02-28"));
        assert_eq!(day_before("2025-01-01").as_deref(), Some("2024-12-31"));
        assert_eq!(day_before("2025-06-15").as_deref(), Some("2025-06-14"));
    }

    #[test]
    fn day_before_rejects_garbage() {
        assert_eq!(day_before("not-a-date"), None);
        assert_eq!(day_before(""), None);
    }

    #[test]
    fn today_is_well_formed() {
        let today = today_local();
        assert!(NaiveDate::parse_from_str(&today, DATE_FORMAT).is_ok());
    }
}
