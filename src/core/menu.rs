use crate::core::index::PeriodIndex;
use crate::core::label::LabelDateParser;
use crate::core::period::WeekLoader;
use crate::domain::ports::{ByteFetcher, LinkLister};
use crate::utils::error::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;

/// Builds the week index from the canteen's menu page.
pub struct MenuService {
    fetcher: Arc<dyn ByteFetcher>,
    lister: Box<dyn LinkLister>,
    parser: LabelDateParser,
    loader: Arc<WeekLoader>,
    menus_uri: String,
}

impl MenuService {
    pub fn new(
        fetcher: Arc<dyn ByteFetcher>,
        lister: Box<dyn LinkLister>,
        parser: LabelDateParser,
        loader: Arc<WeekLoader>,
        menus_uri: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            lister,
            parser,
            loader,
            menus_uri: menus_uri.into(),
        }
    }

    /// Locator of the page listing the published weeks.
    pub fn menus_locator(&self) -> Result<String> {
        self.fetcher.resolve(&self.menus_uri)
    }

    /// Fetches the menu page and indexes every week it links to. Sheets are
    /// not fetched here; each week loads its own on first access.
    pub fn load_index(&self, now: &DateTime<Tz>) -> Result<PeriodIndex> {
        let locator = self.menus_locator()?;
        tracing::info!("Loading menu list from: {}", locator);

        let page = self.fetcher.fetch(&locator)?;
        let document = String::from_utf8_lossy(&page.bytes);

        let entries = self
            .lister
            .list_links(&document)?
            .into_iter()
            .map(|(label, href)| Ok((label, self.fetcher.resolve(&href)?)))
            .collect::<Result<Vec<_>>>()?;

        let index = PeriodIndex::build(entries, &self.parser, now, Arc::clone(&self.loader))?;
        tracing::info!("Indexed {} weeks", index.len());
        Ok(index)
    }
}
