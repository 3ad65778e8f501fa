mod amount;
mod base;
pub mod html;
pub mod routines;
pub mod state;

pub use amount::parse_amount;
pub use base::ExtractionRoutine;
pub use html::CardPriceParser;
pub use routines::{OffersRoutine, RankingsRoutine};
pub use state::{StateScan, MAX_STATE_RECORDS, WIRED_RECORDS_EXPRESSION};
