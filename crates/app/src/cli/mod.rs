use athfal_app::observability::{LoggingConfig, init_logging};
use clap::{Parser, Subcommand};

mod cart;
mod checkout;
mod db;
mod order;
mod price;
mod storefront;

#[derive(Debug, Parser)]
#[command(name = "athfal-app", about = "Athfal Playhouse storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    storefront: storefront::StorefrontArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Edit the local cart
    Cart(cart::CartCommand),

    /// Price the local cart, optionally with a promo code
    Price(price::PriceArgs),

    /// Submit the local cart as an order
    Checkout(checkout::CheckoutArgs),

    /// Inspect and update stored orders
    Order(order::OrderCommand),

    /// Database maintenance
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        init_logging(&self.logging).map_err(|error| error.to_string())?;

        match self.command {
            Commands::Cart(command) => cart::run(command, &self.storefront),
            Commands::Price(args) => price::run(args, &self.storefront),
            Commands::Checkout(args) => checkout::run(args, &self.storefront).await,
            Commands::Order(command) => order::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
