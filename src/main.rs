use std::sync::Arc;

use anyhow::{Context, Result};
use bike_bazaar::config::{self, cli::BrowseArgs, CliArgs, Command, Settings};
use bike_bazaar::models::{Listing, ListingFields, PrincipalId};
use bike_bazaar::share::{format_price, ShareLinks};
use bike_bazaar::{FilterForm, HttpStore, Marketplace, MarketplaceStore, MemoryStore};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let settings = config::load(cli.config_file.as_deref(), &cli.overrides)
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏍️  Bike Bazaar");

    let store = build_store(&cli, &settings)?;
    let market = Marketplace::new(store, settings.cache);

    match cli.command {
        Command::Browse(args) => browse(&market, args).await?,
        Command::Show { id } => {
            let listing = market
                .listing(&id)
                .await
                .with_context(|| format!("Failed to load listing {id}"))?;
            print_listing_details(&listing);
        }
        Command::Mine => {
            let listings = market
                .my_listings()
                .await
                .context("Failed to load your listings")?;
            info!("Found {} of your listings", listings.len());
            print_listings(&listings);
        }
        Command::Sell(args) => {
            let fields = ListingFields {
                title: args.title,
                brand: args.brand,
                model: args.model,
                year: args.year,
                price: args.price,
                mileage: args.mileage,
                condition: args
                    .condition
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid condition")?,
                description: args.description,
                contact_info: args.contact,
            };
            let id = market
                .create_listing(&fields)
                .await
                .context("Failed to create listing")?;
            println!("✅ Listing created: {id}");
        }
        Command::Toggle { id } => {
            let listing = market
                .listing(&id)
                .await
                .with_context(|| format!("Failed to load listing {id}"))?;
            let available = market
                .toggle_availability(&listing)
                .await
                .context("Failed to update listing")?;
            let state = if available { "available" } else { "sold" };
            println!("Listing {id} marked as {state}");
        }
        Command::Delete { id } => {
            market
                .delete_listing(&id)
                .await
                .with_context(|| format!("Failed to delete listing {id}"))?;
            println!("🗑️  Listing {id} deleted");
        }
        Command::Messages { listing_id } => {
            let messages = market
                .messages_for_listing(&listing_id)
                .await
                .context("Failed to load messages")?;
            if messages.is_empty() {
                println!("No messages yet.");
            }
            for message in messages {
                println!(
                    "[{}] {} → {}: {}",
                    message.sent_at.format("%Y-%m-%d %H:%M"),
                    message.sender,
                    message.receiver,
                    message.content
                );
            }
        }
        Command::Send(args) => {
            market
                .send_message(&PrincipalId::new(args.to), &args.content, &args.listing)
                .await
                .context("Failed to send message")?;
            println!("✉️  Message sent");
        }
        Command::Dashboard => {
            let (metrics, activity) =
                tokio::try_join!(market.dashboard_metrics(), market.recent_activity())
                    .context("Failed to load dashboard")?;
            println!(
                "Listings: {} total, {} active, {} sold",
                metrics.total_listings, metrics.active_listings, metrics.sold_listings
            );
            println!(
                "Buyers:   {} registered, {} complete",
                metrics.total_users, metrics.active_buyers
            );
            println!();
            for entry in activity {
                println!("{}  {}", entry.timestamp.format("%Y-%m-%d"), entry.description);
            }
        }
        Command::Share(args) => {
            let site = Url::parse(&args.site_url).context("Invalid site URL")?;
            let listing = market
                .listing(&args.id)
                .await
                .with_context(|| format!("Failed to load listing {}", args.id))?;
            let links = ShareLinks::for_listing(&site, &listing)
                .context("Failed to build share links")?;
            println!("Page:     {}", links.page);
            println!("WhatsApp: {}", links.whatsapp);
            println!("Facebook: {}", links.facebook);
            println!("X:        {}", links.twitter);
            println!("Telegram: {}", links.telegram);
        }
    }

    Ok(())
}

fn build_store(cli: &CliArgs, settings: &Settings) -> Result<Arc<dyn MarketplaceStore>> {
    if cli.overrides.memory {
        let caller = PrincipalId::new(cli.overrides.caller.clone());
        info!(%caller, "Using seeded in-memory store");
        return Ok(Arc::new(
            MemoryStore::seeded(caller).with_founder(PrincipalId::new("founder")),
        ));
    }

    info!(base_url = %settings.store.base_url, "Connecting to marketplace backend");
    let store = HttpStore::new(
        &settings.store.base_url,
        settings.store.caller_token.clone(),
        settings.store.timeout,
    )
    .context("Failed to create store client")?;
    Ok(Arc::new(store))
}

async fn browse(market: &Marketplace, args: BrowseArgs) -> Result<()> {
    let form = FilterForm {
        query: args.query,
        min_price: args.min_price,
        max_price: args.max_price,
        min_year: args.min_year,
        max_year: args.max_year,
        condition: args.condition,
        brand: args.brand,
    };
    let criteria = form.criteria();

    let listings = market
        .browse(&criteria)
        .await
        .context("Failed to load listings")?;

    if listings.is_empty() {
        println!("No bikes match your search criteria.");
        return Ok(());
    }

    let noun = if listings.len() == 1 { "bike" } else { "bikes" };
    println!("Showing {} {noun}\n", listings.len());
    print_listings(&listings);
    Ok(())
}

fn print_listings(listings: &[Listing]) {
    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.title, format_price(listing.price));
        println!(
            "   {} {} · {} · {}",
            listing.brand, listing.model, listing.year, listing.condition
        );
        println!("   ID: {}", listing.id);
        println!();
    }
}

fn print_listing_details(listing: &Listing) {
    println!("{}", listing.title);
    println!("{}", format_price(listing.price));
    println!("Brand:     {}", listing.brand);
    println!("Model:     {}", listing.model);
    println!("Year:      {}", listing.year);
    println!("Condition: {}", listing.condition);
    if let Some(km) = listing.mileage {
        println!("Mileage:   {km} km");
    }
    println!("Status:    {}", if listing.available { "available" } else { "sold" });
    println!("Listed:    {}", listing.listed_at.format("%Y-%m-%d"));
    println!("Contact:   {}", listing.contact_info);
    if !listing.description.is_empty() {
        println!();
        println!("{}", listing.description);
    }
}
