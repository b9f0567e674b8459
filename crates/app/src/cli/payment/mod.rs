use clap::{Args, Subcommand};
use sonit_app::context::AppContext;

mod settle;

#[derive(Debug, Args)]
pub(crate) struct PaymentCommand {
    #[command(subcommand)]
    command: PaymentSubcommand,
}

#[derive(Debug, Subcommand)]
enum PaymentSubcommand {
    /// Apply a gateway outcome by hand, e.g. for a callback that never arrived
    Settle(settle::SettlePaymentArgs),
}

pub(crate) async fn run(command: PaymentCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        PaymentSubcommand::Settle(args) => settle::run(args, ctx).await,
    }
}
