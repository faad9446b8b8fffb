use crate::core::sheet::SpreadsheetDecoder;
use crate::domain::model::Day;
use crate::domain::ports::{ByteFetcher, GridDecoder};
use crate::utils::error::{MenuError, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Largest sheet accepted, in bytes.
pub const MAX_SHEET_SIZE: u64 = 1_000_000;

/// Rejects a source whose announced size is unknown, zero, or above `limit`.
pub fn check_declared_size(locator: &str, declared_size: Option<u64>, limit: u64) -> Result<()> {
    match declared_size {
        None | Some(0) => Err(MenuError::EmptySourceError {
            locator: locator.to_string(),
        }),
        Some(size) if size > limit => Err(MenuError::ContentTooLargeError {
            locator: locator.to_string(),
            size,
            limit,
        }),
        Some(_) => Ok(()),
    }
}

/// Fetches a week sheet and decodes it into days.
pub struct WeekLoader {
    fetcher: Arc<dyn ByteFetcher>,
    grid_decoder: Arc<dyn GridDecoder>,
    decoder: SpreadsheetDecoder,
    encoding: String,
    max_size: u64,
}

impl WeekLoader {
    pub fn new(
        fetcher: Arc<dyn ByteFetcher>,
        grid_decoder: Arc<dyn GridDecoder>,
        decoder: SpreadsheetDecoder,
    ) -> Self {
        Self {
            fetcher,
            grid_decoder,
            decoder,
            encoding: "utf-8".to_string(),
            max_size: MAX_SHEET_SIZE,
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn load(&self, locator: &str, period_start: &DateTime<Tz>) -> Result<Vec<Day>> {
        tracing::debug!("Fetching sheet from: {}", locator);
        let fetched = self.fetcher.fetch(locator)?;
        check_declared_size(locator, fetched.declared_size, self.max_size)?;

        // 宣告大小可能與實際內容不符
        let actual = fetched.bytes.len() as u64;
        if actual > self.max_size {
            return Err(MenuError::ContentTooLargeError {
                locator: locator.to_string(),
                size: actual,
                limit: self.max_size,
            });
        }

        tracing::debug!("Decoding sheet ({} bytes, {})", actual, self.encoding);
        let grid = self.grid_decoder.decode(&fetched.bytes, &self.encoding)?;
        self.decoder.decode(&grid, period_start)
    }
}

enum DaysState {
    Pending(Arc<WeekLoader>),
    Resolved(Arc<Vec<Day>>),
}

/// A dated week window whose days are fetched and decoded on first access.
pub struct Period {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    locator: String,
    state: Mutex<DaysState>,
}

impl std::fmt::Debug for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // try_lock: formatting may happen while a fetch holds the state
        let resolved = self
            .state
            .try_lock()
            .ok()
            .map(|state| matches!(*state, DaysState::Resolved(_)));
        f.debug_struct("Period")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("locator", &self.locator)
            .field("resolved", &resolved)
            .finish()
    }
}

impl Period {
    pub fn new(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        locator: impl Into<String>,
        loader: Arc<WeekLoader>,
    ) -> Self {
        Self {
            start,
            end,
            locator: locator.into(),
            state: Mutex::new(DaysState::Pending(loader)),
        }
    }

    /// A period whose days are already known; no fetch will ever happen.
    pub fn resolved(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        locator: impl Into<String>,
        days: Vec<Day>,
    ) -> Self {
        Self {
            start,
            end,
            locator: locator.into(),
            state: Mutex::new(DaysState::Resolved(Arc::new(days))),
        }
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn contains(&self, now: &DateTime<Tz>) -> bool {
        self.start <= *now && *now <= self.end
    }

    fn lock_state(&self) -> MutexGuard<'_, DaysState> {
        // A panic inside a loader leaves the state untouched, so it stays usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.lock_state(), DaysState::Resolved(_))
    }

    /// Cached days, if the sheet was already decoded.
    pub fn cached_days(&self) -> Option<Arc<Vec<Day>>> {
        match &*self.lock_state() {
            DaysState::Resolved(days) => Some(Arc::clone(days)),
            DaysState::Pending(_) => None,
        }
    }

    /// Fetches and decodes the sheet unless it was already done. The state lock
    /// is held for the whole fetch, so concurrent callers trigger one fetch.
    /// A failed attempt is not cached.
    pub fn fetch_days_if_needed(&self) -> Result<()> {
        self.get_days().map(|_| ())
    }

    pub fn get_days(&self) -> Result<Arc<Vec<Day>>> {
        let mut state = self.lock_state();
        let loader = match &*state {
            DaysState::Resolved(days) => return Ok(Arc::clone(days)),
            DaysState::Pending(loader) => Arc::clone(loader),
        };

        match loader.load(&self.locator, &self.start) {
            Ok(days) => {
                let days = Arc::new(days);
                *state = DaysState::Resolved(Arc::clone(&days));
                tracing::debug!("Cached {} days for {}", days.len(), self.locator);
                Ok(days)
            }
            Err(e) => {
                tracing::warn!("Failed to load week {}: {}", self.locator, e);
                Err(e)
            }
        }
    }

    /// The day containing `now`, else the next upcoming day, else the last day.
    pub fn nearest(&self, now: &DateTime<Tz>) -> Result<Option<Day>> {
        let days = self.get_days()?;
        let found = days
            .iter()
            .find(|day| day.contains(now) || *now < day.start)
            .or_else(|| days.last());
        Ok(found.cloned())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let days = self.cached_days();
        let mut s = serializer.serialize_struct("Period", 4)?;
        s.serialize_field("link", &self.locator)?;
        s.serialize_field("start", &self.start)?;
        s.serialize_field("end", &self.end)?;
        s.serialize_field("days", &days.as_deref())?;
        s.end()
    }
}
