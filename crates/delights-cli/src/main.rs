mod account;
mod listings;
mod search;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use delights_api::{RestaurantClient, SessionStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "delights")]
#[command(about = "Restaurant discovery command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search restaurants by free text and filters
    Search {
        /// Free-text query (name, cuisine or location)
        #[arg(default_value = "")]
        query: String,
        /// Cuisine filter (e.g. "chicken karahi")
        #[arg(long)]
        cuisine: Option<String>,
        /// Location filter
        #[arg(long)]
        location: Option<String>,
        /// Rating filter, passed through to the service
        #[arg(long)]
        rating: Option<String>,
        /// Page to show
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Show type-ahead suggestions for a partial query
    Suggest { query: String },
    /// Log in and store the session credential
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DELIGHTS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and store the session credential
    Signup {
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DELIGHTS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Forget the stored session credential
    Logout,
    /// Check whether the stored session is still accepted
    Status,
    /// Add a restaurant listing
    Add {
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Replace an existing restaurant listing
    Update {
        id: String,
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Delete a restaurant listing
    Delete { id: String },
}

/// Fields shared by `add` and `update`.
#[derive(Debug, Args)]
struct ListingArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    cuisine: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    rating: String,
    /// Image file to upload (JPEG or PNG); repeat for more, at most two are sent
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = delights_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("delights: try `delights search` or `delights --help`");
        return Ok(());
    };

    let session = SessionStore::open(&config.session_path)?;
    let client = RestaurantClient::from_config(&config)?;
    tracing::debug!(env = %config.env, api_url = %config.api_url, "starting");

    match command {
        Commands::Search {
            query,
            cuisine,
            location,
            rating,
            page,
        } => {
            let filters = search::filters(cuisine, location, rating);
            search::run_search(client, session, &config, query, filters, page).await?;
        }
        Commands::Suggest { query } => {
            search::run_suggest(&client, &session, &query).await?;
        }
        Commands::Login { email, password } => {
            account::run_login(&client, &session, &email, &password).await?;
        }
        Commands::Signup {
            firstname,
            lastname,
            email,
            password,
            role,
        } => {
            let new_account = delights_api::NewAccount {
                firstname,
                lastname,
                email,
                password,
                role,
            };
            account::run_signup(&client, &session, &new_account).await?;
        }
        Commands::Logout => account::run_logout(&session)?,
        Commands::Status => account::run_status(&client, &session).await?,
        Commands::Add { listing } => {
            let listing = listings::read_listing(listing)?;
            listings::run_add(&client, &session, &config, &listing).await?;
        }
        Commands::Update { id, listing } => {
            let listing = listings::read_listing(listing)?;
            listings::run_update(&client, &session, &config, &id, &listing).await?;
        }
        Commands::Delete { id } => listings::run_delete(&client, &session, &id).await?,
    }

    Ok(())
}
