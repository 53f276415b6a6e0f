use athfal::{
    orders::{CustomerDetails, PaymentMethod},
    pricing::price_cart,
};
use athfal_app::{
    checkout::{CheckoutRequest, SubmissionError, refresh_cart},
    context::AppContext,
};
use clap::Args;
use jiff::Timestamp;
use tracing::warn;

use super::storefront::{StorefrontArgs, print_receipt, resolve_promo};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Customer name
    #[arg(long, default_value = "")]
    name: String,

    /// Customer email
    #[arg(long, default_value = "")]
    email: String,

    /// Customer phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Delivery address
    #[arg(long)]
    address: Option<String>,

    /// Order notes
    #[arg(long)]
    notes: Option<String>,

    /// Payment method (bank-transfer, qris, e-wallet, cash-on-delivery)
    #[arg(long)]
    payment: Option<PaymentMethod>,

    /// Promo code to apply
    #[arg(long)]
    promo: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CheckoutArgs, storefront: &StorefrontArgs) -> Result<(), String> {
    let settings = storefront.settings()?;
    let mut store = storefront.open_cart(&settings);

    let ctx = AppContext::from_database_url(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let catalog = ctx
        .products
        .list_products()
        .await
        .map_err(|error| format!("failed to load products: {error}"))?;

    // Lines unknown to the database catalog abort checkout; the stored cart stays as is.
    let cart = refresh_cart(store.cart(), &catalog).map_err(|error| {
        format!("{error}; remove them with `athfal-app cart remove` before checking out")
    })?;

    let promos = ctx
        .promo_codes
        .list_promo_codes()
        .await
        .map_err(|error| format!("failed to load promo codes: {error}"))?;

    let at = Timestamp::now();
    let promo = resolve_promo(
        args.promo.as_deref(),
        &promos,
        cart.lines(),
        at,
        settings.locale,
    );

    let priced = price_cart(cart.lines(), promo, at).map_err(|error| error.to_string())?;

    print_receipt(&settings, &priced)?;

    let customer = CustomerDetails {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        notes: args.notes,
    };

    let request = CheckoutRequest {
        customer: &customer,
        payment_method: args.payment,
        promo,
    };

    let order = match ctx.checkout.submit_cart(&mut store, &catalog, request, at).await {
        Ok(order) => order,
        Err(SubmissionError::PartialFailure {
            order,
            draft,
            source,
        }) => {
            warn!(order_uuid = %order, error = %source, "retrying order items");

            let order = ctx
                .checkout
                .retry_items(order, *draft)
                .await
                .map_err(|error| format!("order {order} is incomplete: {error}"))?;

            store
                .clear()
                .map_err(|error| format!("order {order} placed but cart not cleared: {error}"))?;

            order
        }
        Err(error) => return Err(error.to_string()),
    };

    println!("order_uuid: {order}");

    Ok(())
}
