use clap::Args;
use sonit_app::{context::AppContext, domain::products::records::ProductUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct SetInventoryArgs {
    #[arg(long)]
    product_uuid: Uuid,

    /// Units in stock
    #[arg(long)]
    quantity: i64,
}

pub(crate) async fn run(args: SetInventoryArgs, ctx: &AppContext) -> Result<(), String> {
    let inventory = ctx
        .inventory
        .set_inventory(ProductUuid::from_uuid(args.product_uuid), args.quantity)
        .await
        .map_err(|error| format!("failed to set inventory: {}", error.user_message()))?;

    println!("product_uuid: {}", inventory.product_uuid);
    println!("quantity: {}", inventory.quantity);

    Ok(())
}
