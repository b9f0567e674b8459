use clap::Args;
use jiff::{Zoned, civil::Date};
use sonit_app::{
    context::AppContext,
    domain::{
        inventory::{
            data::{InventoryAction, NewInventoryTransaction},
            records::InventoryTransactionUuid,
        },
        products::records::ProductUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RecordTransactionArgs {
    #[arg(long)]
    product_uuid: Uuid,

    /// sale, import, export, return or cancel
    #[arg(long)]
    action: InventoryAction,

    /// Units moved; always positive, the action decides the direction
    #[arg(long)]
    amount: u32,

    #[arg(long, default_value = "")]
    note: String,

    /// Business date, e.g. 2026-03-01; defaults to today
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) async fn run(args: RecordTransactionArgs, ctx: &AppContext) -> Result<(), String> {
    let product_uuid = ProductUuid::from_uuid(args.product_uuid);

    let entry = ctx
        .inventory
        .record_transaction(NewInventoryTransaction {
            uuid: InventoryTransactionUuid::new(),
            product_uuid,
            action: args.action,
            amount: args.amount,
            note: args.note,
            business_date: args.date.unwrap_or_else(|| Zoned::now().date()),
        })
        .await
        .map_err(|error| format!("failed to record transaction: {}", error.user_message()))?;

    let inventory = ctx
        .inventory
        .get_inventory(product_uuid)
        .await
        .map_err(|error| format!("failed to read inventory: {}", error.user_message()))?;

    println!("transaction_uuid: {}", entry.uuid);
    println!("action: {}", entry.action);
    println!("quantity: {}", inventory.quantity);

    Ok(())
}
