//! Utils

use clap::Parser;

/// Arguments for the offers demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to use for the products, cart & offers
    #[clap(short, long, default_value = "apparel")]
    pub fixture: String,

    /// Country hint, as a code ("GB") or a name ("United Kingdom")
    #[clap(short, long, default_value = "GB")]
    pub country: String,

    /// Country code table under `fixtures/countries`; the built-in table is used when omitted
    #[clap(long)]
    pub countries: Option<String>,
}
