//! `magnora`: command-line access to the review data client.

pub use self::error::{Error, Result};
mod error;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands, GlobalArgs};
use magnora_core::{EnvSignals, RatingClient, RatingConfig, ReviewClient, ReviewDraft};
use serde::Serialize;
use tracing::{debug, error};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    logging::init(args.global.environment)?;

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<()> {
    let Cli { global, command } = args;

    match command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Identity => {
            let client = review_client(&global);
            let product_id = client.current_product_id()?;
            print_json(&serde_json::json!({
                "isHydrogenPlatform": client.is_hydrogen_platform(),
                "shopId": client.shop_id(),
                "productId": product_id,
                "initError": client.init_error(),
            }))?;
        }
        Commands::Reviews { product_id, query } => {
            let reviews = review_client(&global)
                .get_reviews(&product_id, &(&query).into())
                .await?;
            print_json(&reviews)?;
        }
        Commands::Product { product_id } => {
            print_json(&review_client(&global).get_product(&product_id).await?)?;
        }
        Commands::Shop => {
            print_json(&review_client(&global).get_shop().await?)?;
        }
        Commands::Submit(submit) => {
            let draft = ReviewDraft {
                author: submit.author,
                title: submit.title,
                content: submit.content,
                rating: submit.rating.map(Into::into),
                ..ReviewDraft::for_product(submit.product_id)
            };
            print_json(&review_client(&global).submit_review(&draft).await?)?;
        }
        Commands::Refresh { product_id } => {
            let client = review_client(&global);
            client.refresh_reviews(&product_id).await?;
            print_json(&client.cache().keys())?;
        }
        Commands::Rating { product_id } => {
            let config = RatingConfig::new(
                global.api_key.clone().unwrap_or_default(),
                global.origin.clone(),
            );
            let rating = RatingClient::new(config)?.get_rating(&product_id).await?;
            print_json(&rating)?;
        }
    }

    Ok(())
}

fn review_client(global: &GlobalArgs) -> ReviewClient {
    let config = global.client_config();
    debug!(origin = %config.origin, environment = %config.environment, "building review client");
    ReviewClient::new(config, Arc::new(EnvSignals::new()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
