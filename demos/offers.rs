//! Offers Demo
//!
//! Loads a fixture set, resolves the offers that apply to its cart for a
//! country hint, and prints the receipt.
//!
//! ```sh
//! RUST_LOG=trellis=debug cargo run --example offers -- --fixture apparel --country IN
//! ```

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use trellis::{
    engine::EligibilityEngine, fixtures::Fixture, receipt::Receipt, utils::DemoArgs,
};

fn init_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_target(true))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_subscriber();

    let args = DemoArgs::parse();

    let mut fixture = Fixture::new();

    fixture
        .load_products(&args.fixture)?
        .load_cart(&args.fixture)?
        .load_offers_or_empty(&args.fixture);

    if let Some(countries) = &args.countries {
        fixture.load_countries(countries)?;
    }

    let cart = fixture.cart()?;
    let engine = EligibilityEngine::new(fixture.country_resolver());

    info!(
        fixture = %args.fixture,
        country = %args.country,
        lines = cart.len(),
        offers = fixture.offers().len(),
        "evaluating offers"
    );

    let applied = engine.resolve_applicable_offers(&cart, fixture.offers(), &args.country);
    let receipt = Receipt::new(&cart, applied)?;

    receipt.write_to(
        io::stdout().lock(),
        fixture.product_meta_map(),
        fixture.offer_meta_map(),
    )?;

    Ok(())
}
