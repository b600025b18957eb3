use clap::Args;
use tally::{ids::CustomerUuid, quote::QuoteRequest};
use tally_app::{
    config::{CheckoutConfig, DatabaseConfig},
    context::AppContext,
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Quote request as JSON: lines, coupon_code, guest_email, address
    #[arg(long)]
    cart: String,

    /// Authenticated customer placing the quote
    #[arg(long)]
    customer: Option<Uuid>,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,
}

pub(crate) async fn run(args: QuoteArgs) -> Result<(), String> {
    let request: QuoteRequest = serde_json::from_str(&args.cart)
        .map_err(|error| format!("invalid cart json: {error}"))?;

    let context = AppContext::from_database_url(&args.database.database_url, &args.checkout)
        .await
        .map_err(|error| format!("failed to start: {error}"))?;

    let quote = context
        .quotes
        .quote(args.customer.map(CustomerUuid::from_uuid), request)
        .await
        .map_err(|error| format!("failed to build quote: {error}"))?;

    let json = serde_json::to_string_pretty(&quote)
        .map_err(|error| format!("failed to encode quote: {error}"))?;

    println!("{json}");

    Ok(())
}
