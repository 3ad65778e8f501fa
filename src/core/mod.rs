mod client;
mod clock;
mod config;
mod errors;
mod gate;
mod session;
pub mod collector;

pub use client::OpenseaScraper;
pub use clock::{Clock, TokioClock};
pub use collector::{CollectionDict, PaginatedCollector, ScrollLoop, ScrollState};
pub use config::{Mode, ScraperConfig, ScrollConfig};
pub use errors::{ScraperError, ScraperResult};
pub use gate::ChallengeGate;
pub use session::SessionGuard;
