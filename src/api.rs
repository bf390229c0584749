pub mod elprisetjustnu;
mod price_source;

pub use self::price_source::{FetchError, PriceSource};
