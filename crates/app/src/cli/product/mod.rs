use clap::{Args, Subcommand};
use sonit_app::context::AppContext;

mod create;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    Create(create::CreateProductArgs),
}

pub(crate) async fn run(command: ProductCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        ProductSubcommand::Create(args) => create::run(args, ctx).await,
    }
}
