use clap::Args;
use tally::ids::CustomerUuid;
use tally_app::{
    config::{CheckoutConfig, DatabaseConfig},
    context::AppContext,
    domain::checkout::CommitRequest,
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Commit request as JSON: lines, address, payment_method, currency,
    /// exchange_rate, guest_email, coupon_code
    #[arg(long)]
    request: String,

    /// Authenticated customer placing the order
    #[arg(long)]
    customer: Option<Uuid>,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,
}

pub(crate) async fn run(args: CheckoutArgs) -> Result<(), String> {
    let request: CommitRequest = serde_json::from_str(&args.request)
        .map_err(|error| format!("invalid checkout json: {error}"))?;

    let context = AppContext::from_database_url(&args.database.database_url, &args.checkout)
        .await
        .map_err(|error| format!("failed to start: {error}"))?;

    let receipt = context
        .checkout
        .commit(args.customer.map(CustomerUuid::from_uuid), request)
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    println!("order_uuid: {}", receipt.order);
    println!("total_amount: {} {}", receipt.total_amount, receipt.currency.code);

    Ok(())
}
