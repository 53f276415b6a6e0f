use athfal::{
    cart::{CartError, clamp_to_stock},
    pricing::price_cart,
};
use clap::{Args, Subcommand};
use jiff::Timestamp;

use super::storefront::{StorefrontArgs, print_receipt};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add a product, or increase its quantity
    Add(AddArgs),

    /// Remove a product line
    Remove(ProductArgs),

    /// Replace a line's quantity; zero or less removes the line
    Set(SetArgs),

    /// Print the cart with current prices
    Show,

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product identifier
    product: String,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product identifier
    product: String,

    /// Quantity to add
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Product identifier
    product: String,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

pub(crate) fn run(command: CartCommand, storefront: &StorefrontArgs) -> Result<(), String> {
    let settings = storefront.settings()?;
    let fixture = storefront.fixture()?;
    let mut store = storefront.open_cart(&settings);

    match command.command {
        CartSubcommand::Add(args) => {
            let product = fixture.product(&args.product).map_err(|error| error.to_string())?;
            let available = store.cart().available_to_add(product);
            let quantity = args.quantity.min(available);

            if quantity < args.quantity {
                println!(
                    "only {available} more of {} in stock; adding {quantity}",
                    product.name
                );
            }

            store
                .add_line(product.clone(), quantity)
                .map_err(|error| persist_error(&error))?;
        }
        CartSubcommand::Remove(args) => {
            let removed = store
                .remove_line(&args.product)
                .map_err(|error| persist_error(&error))?;

            if !removed {
                println!("{} is not in the cart", args.product);
            }
        }
        CartSubcommand::Set(args) => {
            let quantity = match fixture.product(&args.product) {
                Ok(product) if args.quantity > 0 => {
                    let requested = u32::try_from(args.quantity).unwrap_or(u32::MAX);

                    i64::from(clamp_to_stock(product, requested))
                }
                _ => args.quantity,
            };

            let changed = store
                .set_quantity(&args.product, quantity)
                .map_err(|error| persist_error(&error))?;

            if !changed {
                println!("{} is not in the cart", args.product);
            }
        }
        CartSubcommand::Show => {}
        CartSubcommand::Clear => {
            store.clear().map_err(|error| persist_error(&error))?;
        }
    }

    store
        .refresh_products(fixture.catalog())
        .map_err(|error| persist_error(&error))?;

    let priced = price_cart(store.cart().lines(), None, Timestamp::now())
        .map_err(|error| error.to_string())?;

    print_receipt(&settings, &priced)
}

fn persist_error(error: &CartError) -> String {
    format!("failed to save cart: {error}")
}

