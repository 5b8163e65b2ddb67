//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in cart order
    pub lines: Vec<CartLineFixture>,
}

/// A single cart line referencing a product by its fixture key
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key from the products fixture
    pub product: String,

    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
