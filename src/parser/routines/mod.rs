mod offers;
mod rankings;

pub use offers::{OfferCard, OffersRoutine};
pub use rankings::RankingsRoutine;
