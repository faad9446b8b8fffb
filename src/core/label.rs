use crate::utils::error::{MenuError, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Ordered month names, January first, in their lowercase unaccented form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTable {
    names: Vec<String>,
}

impl MonthTable {
    pub fn french() -> Self {
        Self {
            names: [
                "janvier",
                "fevrier",
                "mars",
                "avril",
                "mai",
                "juin",
                "juillet",
                "aout",
                "septembre",
                "octobre",
                "novembre",
                "decembre",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }

    /// 1-based month number of `token`, ignoring case and the `é`/`û` accents.
    pub fn lookup(&self, token: &str) -> Option<u32> {
        let token = token.to_lowercase().replace('é', "e").replace('û', "u");
        self.names
            .iter()
            .position(|name| *name == token)
            .map(|i| i as u32 + 1)
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        Self::french()
    }
}

/// Midnight and last nanosecond of `date` in `tz`.
pub fn day_bounds(tz: &Tz, date: NaiveDate) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let start = tz
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = tz
        .from_local_datetime(&date.and_hms_nano_opt(23, 59, 59, 999_999_999)?)
        .latest()?;
    Some((start, end))
}

/// Turns week labels such as `"Semaine du 3 au 9 mars"` into time windows.
#[derive(Debug, Clone)]
pub struct LabelDateParser {
    months: MonthTable,
    tz: Tz,
}

impl LabelDateParser {
    pub fn new(months: MonthTable, tz: Tz) -> Self {
        Self { months, tz }
    }

    /// Parses `label` relative to `now`, which supplies the year.
    ///
    /// When the start day is not before the end day the window crosses a month
    /// boundary and starts in the month preceding the named one.
    pub fn parse(&self, label: &str, now: &DateTime<Tz>) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
        let fail = |reason: &str| MenuError::ParseError {
            label: label.to_string(),
            reason: reason.to_string(),
        };

        let normalized = label.to_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(fail("empty label"));
        }

        let (start_day, end_day, month_token) = match tokens.as_slice() {
            [_, "du", start, "au", end, month, ..] => {
                let start: u32 = start.parse().map_err(|_| fail("invalid start day"))?;
                let end: u32 = end.parse().map_err(|_| fail("invalid end day"))?;
                (start, end, *month)
            }
            _ => return Err(fail("expected '<word> du <day> au <day> <month>'")),
        };

        let end_month = self
            .months
            .lookup(month_token)
            .ok_or_else(|| fail("unknown month name"))?;

        let now = now.with_timezone(&self.tz);
        // 跨年：一月看到十二月的週屬於去年，十二月看到一月的週屬於明年
        let year = match (end_month, now.month()) {
            (12, 1) => now.year() - 1,
            (1, 12) => now.year() + 1,
            _ => now.year(),
        };

        let (start_year, start_month) = if start_day < end_day {
            (year, end_month)
        } else if end_month == 1 {
            (year - 1, 12)
        } else {
            (year, end_month - 1)
        };

        let start_date = NaiveDate::from_ymd_opt(start_year, start_month, start_day)
            .ok_or_else(|| fail("start day does not exist"))?;
        let end_date = NaiveDate::from_ymd_opt(year, end_month, end_day)
            .ok_or_else(|| fail("end day does not exist"))?;

        let (start, _) =
            day_bounds(&self.tz, start_date).ok_or_else(|| fail("start day has no midnight"))?;
        let (_, end) =
            day_bounds(&self.tz, end_date).ok_or_else(|| fail("end day has no end"))?;

        tracing::debug!("Parsed label '{}' as {} .. {}", label, start, end);
        Ok((start, end))
    }
}

impl Default for LabelDateParser {
    fn default() -> Self {
        Self::new(MonthTable::french(), chrono_tz::Europe::Paris)
    }
}
