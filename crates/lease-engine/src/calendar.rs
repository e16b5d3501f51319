use chrono::{Datelike, NaiveDate};

/// Month arithmetic for lease terms and reporting periods
pub struct LeaseCalendar;

impl LeaseCalendar {
    /// Whole calendar months from `from` up to, but excluding, `until`
    ///
    /// A month only counts once its day-of-month has been reached again, so
    /// 2024-01-15..2024-02-14 is 0 months and 2024-01-15..2024-02-15 is 1.
    pub fn whole_months(from: NaiveDate, until: NaiveDate) -> u32 {
        if until <= from {
            return 0;
        }

        let mut months = (until.year() - from.year()) * 12 + until.month() as i32
            - from.month() as i32;
        if until.day() < from.day() {
            months -= 1;
        }

        months.max(0) as u32
    }

    /// Length of a lease running through `end` inclusive
    pub fn term_months(start: NaiveDate, end: Option<NaiveDate>) -> Option<u32> {
        let until = end?.succ_opt()?;
        Some(Self::whole_months(start, until))
    }

    /// Months left on a lease as of a date, floored at zero
    pub fn remaining_months(as_of: NaiveDate, end: Option<NaiveDate>) -> Option<u32> {
        let until = end?.succ_opt()?;
        Some(Self::whole_months(as_of, until))
    }

    /// Last day of the month containing `date`
    pub fn month_end(date: NaiveDate) -> Option<NaiveDate> {
        Self::last_day_of_month(date.year(), date.month())
    }

    fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
        if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?.pred_opt()
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
        }
    }

    /// Every month end falling within `[from, to]`, ascending
    pub fn month_ends_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = Self::month_end(from);

        while let Some(date) = current {
            if date > to {
                break;
            }
            dates.push(date);
            current = date.succ_opt().and_then(Self::month_end);
        }

        dates
    }
}
