mod listing;
mod offer;
mod price;

pub use listing::ListingItem;
pub use offer::{Offer, OfferSet};
pub use price::{Currency, PriceRecord};
