use chrono::{Datelike, NaiveDate};

/// Calendar quarter (1-4) of a date.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Last day of `quarter` in `year`: Mar 31, Jun 30, Sep 30 or Dec 31.
pub fn quarter_end(year: i32, quarter: u32) -> Option<NaiveDate> {
    let (month, day) = match quarter {
        1 => (3, 31),
        2 => (6, 30),
        3 => (9, 30),
        4 => (12, 31),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// End of the quarter before the one containing `reference`.
/// A Q1 date resolves to Dec 31 of the previous year.
pub fn previous_quarter_end(reference: NaiveDate) -> NaiveDate {
    let (year, quarter) = match quarter_of(reference) {
        1 => (reference.year() - 1, 4),
        q => (reference.year(), q - 1),
    };
    // quarter is always 1..=4 here
    quarter_end(year, quarter).unwrap_or(reference)
}

/// End of the quarter containing `reference`, one year earlier.
pub fn same_quarter_last_year_end(reference: NaiveDate) -> NaiveDate {
    quarter_end(reference.year() - 1, quarter_of(reference)).unwrap_or(reference)
}
