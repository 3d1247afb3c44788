use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the bike-bazaar client.
#[derive(Debug, Parser)]
#[command(name = "bike-bazaar", version, about = "Second-hand bike marketplace client")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BIKE_BAZAAR_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: StoreOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreOverrides {
    /// Override the marketplace backend URL.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the caller identity token sent to the backend.
    #[arg(long = "caller-token", value_name = "TOKEN")]
    pub caller_token: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Use the seeded in-memory store instead of the backend.
    #[arg(long)]
    pub memory: bool,

    /// Caller identity when running against the in-memory store.
    #[arg(long = "as", value_name = "PRINCIPAL", default_value = "seller-ravi")]
    pub caller: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Browse available listings, optionally filtered.
    Browse(BrowseArgs),
    /// Show a single listing.
    Show { id: String },
    /// List the caller's own listings.
    Mine,
    /// Put a bike up for sale.
    Sell(SellArgs),
    /// Flip a listing between available and sold.
    Toggle { id: String },
    /// Permanently delete a listing.
    Delete { id: String },
    /// Print the message thread of a listing.
    Messages { listing_id: String },
    /// Send a message about a listing.
    Send(SendArgs),
    /// Print admin dashboard numbers and recent activity.
    Dashboard,
    /// Print share links for a listing.
    Share(ShareArgs),
}

/// Filter inputs are taken as raw text; values that do not parse are ignored.
#[derive(Debug, Args, Default, Clone)]
pub struct BrowseArgs {
    /// Free-text search over title, brand and model.
    #[arg(long, short, default_value = "")]
    pub query: String,
    #[arg(long = "min-price", default_value = "")]
    pub min_price: String,
    #[arg(long = "max-price", default_value = "")]
    pub max_price: String,
    #[arg(long = "min-year", default_value = "")]
    pub min_year: String,
    #[arg(long = "max-year", default_value = "")]
    pub max_year: String,
    /// excellent, good, fair or all.
    #[arg(long, default_value = "all")]
    pub condition: String,
    #[arg(long, default_value = "")]
    pub brand: String,
}

#[derive(Debug, Args, Clone)]
pub struct SellArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub price: i64,
    /// Odometer reading in km.
    #[arg(long)]
    pub mileage: Option<i64>,
    /// excellent, good or fair.
    #[arg(long)]
    pub condition: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub contact: String,
}

#[derive(Debug, Args, Clone)]
pub struct SendArgs {
    /// Principal of the recipient.
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub listing: String,
    pub content: String,
}

#[derive(Debug, Args, Clone)]
pub struct ShareArgs {
    pub id: String,
    /// Public site URL used to build listing links.
    #[arg(long = "site-url", default_value = "https://bikebazaar.example")]
    pub site_url: String,
}
