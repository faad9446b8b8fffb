use crate::core::label::LabelDateParser;
use crate::core::period::{Period, WeekLoader};
use crate::utils::error::{MenuError, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;

/// Weeks sorted by start date.
#[derive(Debug, Default, Serialize)]
pub struct PeriodIndex {
    periods: Vec<Period>,
}

impl PeriodIndex {
    /// Parses every `(label, locator)` entry. The first label that fails to
    /// parse aborts the whole build.
    pub fn build<I>(
        entries: I,
        parser: &LabelDateParser,
        now: &DateTime<Tz>,
        loader: Arc<WeekLoader>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let periods = entries
            .into_iter()
            .map(|(label, locator)| {
                let (start, end) = parser.parse(&label, now)?;
                Ok(Period::new(start, end, locator, Arc::clone(&loader)))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Built index of {} weeks", periods.len());
        Ok(Self::from_periods(periods))
    }

    pub fn from_periods(mut periods: Vec<Period>) -> Self {
        periods.sort_by(|a, b| a.start().cmp(b.start()));
        Self { periods }
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Start of the earliest week.
    pub fn start(&self) -> Option<&DateTime<Tz>> {
        self.periods.first().map(Period::start)
    }

    /// End of the latest week.
    pub fn end(&self) -> Option<&DateTime<Tz>> {
        self.periods.last().map(Period::end)
    }

    pub fn current(&self, now: &DateTime<Tz>) -> Option<&Period> {
        self.periods.iter().find(|p| p.contains(now))
    }

    /// The week containing `now`, else the next upcoming week, else the last
    /// (stale) week.
    pub fn nearest(&self, now: &DateTime<Tz>) -> Option<&Period> {
        self.periods
            .iter()
            .find(|p| p.contains(now) || *now < *p.start())
            .or_else(|| self.periods.last())
    }

    /// Like [`nearest`](Self::nearest), but an index without weeks is an error.
    pub fn require_nearest(&self, now: &DateTime<Tz>) -> Result<&Period> {
        self.nearest(now).ok_or(MenuError::NoPublishedWeekError)
    }

    /// Adds the weeks of `other` whose `(start, end)` pair is not already present.
    pub fn merge(&mut self, other: PeriodIndex) {
        for period in other.periods {
            let known = self
                .periods
                .iter()
                .any(|p| p.start() == period.start() && p.end() == period.end());
            if !known {
                self.periods.push(period);
            }
        }
        self.periods.sort_by(|a, b| a.start().cmp(b.start()));
    }
}
