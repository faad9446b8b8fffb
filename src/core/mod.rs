pub mod index;
pub mod label;
pub mod menu;
pub mod period;
pub mod sheet;
pub mod text;

pub use crate::domain::model::{Day, Meal, Meals};
pub use crate::domain::ports::{ByteFetcher, FetchedBytes, GridDecoder, LinkLister};
pub use crate::utils::error::Result;
