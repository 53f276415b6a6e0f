use std::{io, path::PathBuf};

use athfal::{
    cart::{CartLine, storage::FileCartStorage, store::CartStore},
    currency::Locale,
    fixtures::Fixture,
    pricing::PricedCart,
    promotions::{PromoCode, validation::validate_promo_code},
    receipt::write_receipt,
    settings::StorefrontSettings,
};
use clap::Args;
use jiff::Timestamp;

/// Local storefront state shared by every command.
#[derive(Debug, Args)]
pub(crate) struct StorefrontArgs {
    /// Directory the cart is persisted in
    #[arg(long, env = "ATHFAL_CART_DIR", default_value = ".athfal", global = true)]
    cart_dir: PathBuf,

    /// Directory holding product and promo code fixtures
    #[arg(long, env = "ATHFAL_FIXTURES", default_value = "fixtures", global = true)]
    fixtures: PathBuf,

    /// Fixture set to load
    #[arg(long, default_value = "storefront", global = true)]
    fixture_set: String,

    /// Storefront settings file (YAML)
    #[arg(long, env = "ATHFAL_SETTINGS", global = true)]
    settings: Option<PathBuf>,
}

impl StorefrontArgs {
    pub(crate) fn settings(&self) -> Result<StorefrontSettings, String> {
        match &self.settings {
            Some(path) => StorefrontSettings::load(path).map_err(|error| {
                format!("failed to load settings from {}: {error}", path.display())
            }),
            None => Ok(StorefrontSettings::default()),
        }
    }

    pub(crate) fn fixture(&self) -> Result<Fixture, String> {
        Fixture::from_set(&self.fixtures, &self.fixture_set)
            .map_err(|error| format!("failed to load fixtures: {error}"))
    }

    pub(crate) fn open_cart(&self, settings: &StorefrontSettings) -> CartStore<FileCartStorage> {
        CartStore::open(FileCartStorage::new(&self.cart_dir, &settings.cart_key))
    }
}

/// Validate an entered promo code, printing the outcome. Rejected codes price as no promo.
pub(crate) fn resolve_promo<'a>(
    input: Option<&str>,
    promos: &'a [PromoCode],
    lines: &[CartLine],
    at: Timestamp,
    locale: Locale,
) -> Option<&'a PromoCode> {
    let input = input?;

    match validate_promo_code(input, promos, lines, at) {
        Ok(validated) => {
            for warning in validated.warnings() {
                println!("{}", warning.message(locale));
            }

            Some(validated.promo())
        }
        Err(error) => {
            println!("{}", error.message(locale));

            None
        }
    }
}

pub(crate) fn print_receipt(
    settings: &StorefrontSettings,
    priced: &PricedCart,
) -> Result<(), String> {
    println!("{}", settings.store_name);

    write_receipt(io::stdout().lock(), priced, settings.locale).map_err(|error| error.to_string())
}
