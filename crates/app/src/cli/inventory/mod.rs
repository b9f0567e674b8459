use clap::{Args, Subcommand};
use sonit_app::context::AppContext;

mod record;
mod set;

#[derive(Debug, Args)]
pub(crate) struct InventoryCommand {
    #[command(subcommand)]
    command: InventorySubcommand,
}

#[derive(Debug, Subcommand)]
enum InventorySubcommand {
    /// Create the stock row for a product
    Set(set::SetInventoryArgs),

    /// Append a ledger entry and apply it to stock
    Record(record::RecordTransactionArgs),
}

pub(crate) async fn run(command: InventoryCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        InventorySubcommand::Set(args) => set::run(args, ctx).await,
        InventorySubcommand::Record(args) => record::run(args, ctx).await,
    }
}
