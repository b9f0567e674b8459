use clap::Args;
use sonit_app::{
    context::AppContext,
    domain::{
        orders::data::DEFAULT_CURRENCY,
        products::{data::NewProduct, records::ProductUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Unit price in minor currency units
    #[arg(long)]
    price: u64,

    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,

    #[arg(long, default_value = "")]
    image_url: String,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    product_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateProductArgs, ctx: &AppContext) -> Result<(), String> {
    let uuid = args
        .product_uuid
        .map_or_else(ProductUuid::new, ProductUuid::from_uuid);

    let product = ctx
        .products
        .create_product(NewProduct {
            uuid,
            name: args.name,
            image_url: args.image_url,
            price: args.price,
            currency: args.currency,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("name: {}", product.name);
    println!("price: {} {}", product.price, product.currency);

    Ok(())
}
