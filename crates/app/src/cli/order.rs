use athfal::orders::OrderStatus;
use athfal_app::{context::AppContext, domain::orders::records::OrderUuid};
use clap::{Args, Subcommand};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Print an order and its items as JSON
    Show {
        /// Order UUID
        order_uuid: Uuid,
    },

    /// Move an order to a new status
    Status {
        /// Order UUID
        order_uuid: Uuid,

        /// New status (pending, processing, shipped, completed, cancelled)
        status: OrderStatus,
    },
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&command.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match command.command {
        OrderSubcommand::Show { order_uuid } => {
            let order_uuid = OrderUuid::from(order_uuid);

            let order = ctx
                .orders
                .get_order(order_uuid)
                .await
                .map_err(|error| format!("failed to load order: {error}"))?;

            let items = ctx
                .orders
                .get_order_items(order_uuid)
                .await
                .map_err(|error| format!("failed to load order items: {error}"))?;

            let json = serde_json::to_string_pretty(&serde_json::json!({
                "order": order,
                "items": items,
            }))
            .map_err(|error| error.to_string())?;

            println!("{json}");
        }
        OrderSubcommand::Status { order_uuid, status } => {
            let order = ctx
                .orders
                .update_status(OrderUuid::from(order_uuid), status)
                .await
                .map_err(|error| format!("failed to update order status: {error}"))?;

            println!("order_uuid: {}", order.uuid);
            println!("status: {}", order.status);
        }
    }

    Ok(())
}
