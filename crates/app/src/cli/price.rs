use athfal::pricing::price_cart;
use clap::Args;
use jiff::Timestamp;

use super::storefront::{StorefrontArgs, print_receipt, resolve_promo};

#[derive(Debug, Args)]
pub(crate) struct PriceArgs {
    /// Promo code to apply
    #[arg(long)]
    promo: Option<String>,

    /// Price as of this instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) fn run(args: PriceArgs, storefront: &StorefrontArgs) -> Result<(), String> {
    let settings = storefront.settings()?;
    let fixture = storefront.fixture()?;
    let mut store = storefront.open_cart(&settings);
    let at = args.at.unwrap_or_else(Timestamp::now);

    store
        .refresh_products(fixture.catalog())
        .map_err(|error| format!("failed to save cart: {error}"))?;

    let promo = resolve_promo(
        args.promo.as_deref(),
        fixture.promo_codes(),
        store.cart().lines(),
        at,
        settings.locale,
    );

    let priced = price_cart(store.cart().lines(), promo, at).map_err(|error| error.to_string())?;

    print_receipt(&settings, &priced)
}
