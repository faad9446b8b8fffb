pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::MenuConfig;
pub use crate::core::{
    index::PeriodIndex,
    label::{LabelDateParser, MonthTable},
    menu::MenuService,
    period::{Period, WeekLoader},
    sheet::{SheetLayout, SpreadsheetDecoder},
    text::TextNormalizer,
};
pub use crate::domain::model::{Day, Meal, Meals};
pub use crate::utils::error::{MenuError, Result};
