use clap::{Args, ValueEnum};
use sonit_app::{
    context::AppContext,
    domain::payments::records::PaymentUuid,
    gateway::CallbackOutcome,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Outcome {
    Success,
    Cancel,
}

#[derive(Debug, Args)]
pub(crate) struct SettlePaymentArgs {
    #[arg(long)]
    payment_uuid: Uuid,

    #[arg(long, value_enum)]
    outcome: Outcome,
}

pub(crate) async fn run(args: SettlePaymentArgs, ctx: &AppContext) -> Result<(), String> {
    let payment = PaymentUuid::from_uuid(args.payment_uuid);

    let result = match args.outcome {
        Outcome::Success => {
            let signature = ctx.signer.sign(CallbackOutcome::Success, payment);

            ctx.settlement.on_success(payment, &signature).await
        }
        Outcome::Cancel => {
            let signature = ctx.signer.sign(CallbackOutcome::Cancel, payment);

            ctx.settlement.on_cancel(payment, &signature).await
        }
    };

    let outcome =
        result.map_err(|error| format!("failed to settle payment: {}", error.user_message()))?;

    if !outcome.transitioned {
        println!("payment was already settled with this outcome");
    }

    println!("payment_status: {}", outcome.payment_status);
    println!("order_status: {}", outcome.order_status);
    println!("redirect_url: {}", outcome.redirect_url);

    Ok(())
}
