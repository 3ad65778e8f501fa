pub mod browser;
pub mod core;
pub mod items;
pub mod parser;
pub mod stats;

pub use browser::{ChromiumDriver, Driver, Page};
pub use core::OpenseaScraper;
pub use core::{Mode, ScraperConfig, ScraperError, ScraperResult};
pub use items::{Currency, ListingItem, Offer, OfferSet, PriceRecord};
pub use stats::StatsTracker;
