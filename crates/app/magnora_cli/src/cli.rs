use clap::{Args, Parser, Subcommand};
use magnora_core::{ClientConfig, Environment, ReviewQuery, SortBy, SortOrder};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "magnora", version, about = "Query and submit product reviews")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Page origin relative endpoints resolve against.
    #[arg(
        long,
        global = true,
        env = "MAGNORA_ORIGIN",
        default_value = magnora_core::config::DEFAULT_ORIGIN
    )]
    pub origin: Url,

    /// Override for every review endpoint.
    #[arg(long, global = true, env = "MAGNORA_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = "MAGNORA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Explicit shop id; wins over anything detected from the environment.
    #[arg(long, global = true, env = "MAGNORA_SHOP_ID")]
    pub shop_id: Option<String>,

    #[arg(
        long,
        global = true,
        env = "MAGNORA_ENVIRONMENT",
        default_value_t = Environment::Production
    )]
    pub environment: Environment,
}

impl GlobalArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            shop_id: self.shop_id.clone(),
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            environment: self.environment,
            origin: self.origin.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,
    /// Show the detected shop identity and current product
    Identity,
    /// List reviews of a product
    Reviews {
        product_id: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show a product
    Product { product_id: String },
    /// Show the shop record
    Shop,
    /// Submit a review
    Submit(SubmitArgs),
    /// Drop cached review lists of a product and fetch the default list again
    Refresh { product_id: String },
    /// Show the rating summary of a product
    Rating { product_id: String },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
    #[arg(long)]
    pub sort_by: Option<SortBy>,
    #[arg(long)]
    pub sort_order: Option<SortOrder>,
}

impl From<&QueryArgs> for ReviewQuery {
    fn from(args: &QueryArgs) -> Self {
        ReviewQuery {
            limit: args.limit,
            offset: args.offset,
            sort_by: args.sort_by,
            sort_order: args.sort_order,
        }
    }
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(long)]
    pub product_id: String,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: Option<u8>,
}
