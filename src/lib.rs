//! Trellis
//!
//! Trellis is an offer eligibility and bundle pricing engine. Given a cart
//! snapshot, a catalog of bundle and carousel offers and a country hint, it
//! works out which offers apply, resolves each offer's per-country bundle
//! price, and splits the matched cart quantities into bundle-priced and
//! standard-priced groups.

pub mod allocation;
pub mod carts;
pub mod countries;
pub mod engine;
pub mod exclusions;
pub mod fixtures;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod utils;
