use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Days, Months, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

pub fn parse_optional_date(s: Option<&str>) -> AppResult<Option<NaiveDate>> {
    s.map(parse_date).transpose()
}

/// Inclusive bounds of a period: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
pub fn bounds_of_period(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let p = p.trim();

    // YYYY-MM-DD
    if let Ok(d) = NaiveDate::parse_from_str(p, "%Y-%m-%d") {
        return Ok((d, d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d") {
        return Ok((first, month_end(first)?));
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
        && let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        )
    {
        return Ok((first, last));
    }

    Err(AppError::InvalidDate(format!("Invalid period: {p}")))
}

/// `start:end` ranges or a single period; `None` means the current month.
pub fn resolve_period(period: Option<&str>) -> AppResult<(NaiveDate, NaiveDate)> {
    match period {
        Some(p) if p.contains(':') => {
            let (a, b) = p
                .split_once(':')
                .ok_or_else(|| AppError::InvalidDate(p.to_string()))?;
            let (start, _) = bounds_of_period(a)?;
            let (_, end) = bounds_of_period(b)?;
            if end < start {
                return Err(AppError::InvalidDate(format!("Empty range: {p}")));
            }
            Ok((start, end))
        }
        Some(p) => bounds_of_period(p),
        None => {
            let first = month_start(today());
            Ok((first, month_end(first)?))
        }
    }
}

pub fn days_before(d: NaiveDate, n: u64) -> AppResult<NaiveDate> {
    d.checked_sub_days(Days::new(n))
        .ok_or_else(|| AppError::InvalidDate(format!("{d} - {n} days is out of range")))
}

/// Monday of the ISO week containing `d`.
pub fn week_start(d: NaiveDate) -> AppResult<NaiveDate> {
    days_before(d, u64::from(d.weekday().num_days_from_monday()))
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn month_end(d: NaiveDate) -> AppResult<NaiveDate> {
    month_start(d)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::InvalidDate(format!("No month end for {d}")))
}

pub fn months_before(d: NaiveDate, n: u32) -> AppResult<NaiveDate> {
    d.checked_sub_months(Months::new(n))
        .ok_or_else(|| AppError::InvalidDate(format!("{d} - {n} months is out of range")))
}

pub fn iso_week_label(d: NaiveDate) -> String {
    let w = d.iso_week();
    format!("{}-W{:02}", w.year(), w.week())
}
