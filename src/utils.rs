use chrono::NaiveDate;

/// Number of days of the window `[date_1, date_2]`, both included. An inverted
/// window is empty.
pub fn count_days_between_two_dates(date_1: NaiveDate, date_2: NaiveDate) -> usize {
    usize::try_from((date_2 - date_1).num_days() + 1).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn count_days_includes_both_ends() {
        let first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2018, 1, 10).unwrap();
        assert_eq!(count_days_between_two_dates(first, last), 10);
        assert_eq!(count_days_between_two_dates(first, first), 1);
        assert_eq!(count_days_between_two_dates(last, first), 0);
    }
}
