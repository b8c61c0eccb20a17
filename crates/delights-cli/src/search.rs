//! `search` and `suggest` command handlers.

use std::time::Duration;

use anyhow::bail;
use delights_api::{RestaurantClient, SessionStore};
use delights_core::{AppConfig, CanonicalRestaurant, ResultPage, SearchFilters};
use delights_search::{ControllerEvent, ControllerSettings, PageControls, QueryController};
use tokio::sync::mpsc::UnboundedReceiver;

/// Builds filters from optional flags, treating blank values as unset.
pub(crate) fn filters(
    cuisine: Option<String>,
    location: Option<String>,
    rating: Option<String>,
) -> SearchFilters {
    SearchFilters::from_form(
        cuisine.as_deref().unwrap_or_default(),
        location.as_deref().unwrap_or_default(),
        rating.as_deref().unwrap_or_default(),
    )
}

/// Runs one search through the query controller and prints the page.
///
/// Page 1 is always fetched first so the page count is known before `page`
/// is requested.
///
/// # Errors
///
/// Returns an error if there is no valid session, the search fails, or
/// `page` is beyond the last page.
pub(crate) async fn run_search(
    client: RestaurantClient,
    session: SessionStore,
    config: &AppConfig,
    query: String,
    filters: SearchFilters,
    page: u32,
) -> anyhow::Result<()> {
    // A single submission per run, so there is nothing to coalesce.
    let settings = ControllerSettings {
        quiet_period: Duration::ZERO,
        ..ControllerSettings::from_config(config)
    };
    let (controller, mut events) = QueryController::new(client, session.clone(), settings);

    controller.submit_query(query, filters);
    let mut result = next_page(&mut events, &session).await?;

    if page != result.page {
        if !controller.go_to_page(page) {
            bail!(
                "page {page} is out of range; there {} {} page{}",
                if result.total_pages == 1 { "is" } else { "are" },
                result.total_pages,
                if result.total_pages == 1 { "" } else { "s" },
            );
        }
        result = next_page(&mut events, &session).await?;
    }

    print_page(&result, &config.asset_origin);
    Ok(())
}

/// Waits for the controller to settle and returns the applied page.
///
/// Every notice the controller emits reports a failure, so the first one
/// ends the wait.
async fn next_page(
    events: &mut UnboundedReceiver<ControllerEvent>,
    session: &SessionStore,
) -> anyhow::Result<ResultPage> {
    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::Results(page) => return Ok(page),
            ControllerEvent::Notice(message) if !session.is_authenticated() => {
                bail!("{message}; run `delights login` first")
            }
            ControllerEvent::Notice(message) => bail!("{message}"),
            ControllerEvent::RedirectToLogin => bail!("not logged in; run `delights login` first"),
        }
    }
    bail!("search ended without a result")
}

/// Prints type-ahead suggestions, one per line.
///
/// # Errors
///
/// Returns an error if the suggestions request fails.
pub(crate) async fn run_suggest(
    client: &RestaurantClient,
    session: &SessionStore,
    query: &str,
) -> anyhow::Result<()> {
    let credential = session.credential();
    let suggestions = client.suggestions(query, credential.as_deref()).await?;
    if suggestions.is_empty() {
        println!("no suggestions");
    }
    for suggestion in &suggestions {
        println!("{suggestion}");
    }
    Ok(())
}

fn print_page(result: &ResultPage, asset_origin: &str) {
    if result.restaurants.is_empty() {
        println!("no restaurants found");
    } else {
        print_header();
        for restaurant in &result.restaurants {
            print_restaurant(restaurant, asset_origin);
        }
    }

    let controls = PageControls::for_page(result);
    let mut footer = format!("page {} of {}", controls.page(), controls.total_pages());
    if let Some(previous) = controls.previous() {
        footer.push_str(&format!("  (previous: --page {previous})"));
    }
    if let Some(next) = controls.next() {
        footer.push_str(&format!("  (next: --page {next})"));
    }
    println!();
    println!("{footer}");
}

pub(crate) fn print_header() {
    println!(
        "{:<26}{:<28}{:<18}{:<8}LOCATION",
        "ID", "NAME", "CUISINE", "RATING"
    );
}

/// Prints one table row followed by the restaurant's displayable image URLs.
pub(crate) fn print_restaurant(restaurant: &CanonicalRestaurant, asset_origin: &str) {
    println!(
        "{:<26}{:<28}{:<18}{:<8.1}{}",
        truncate(&restaurant.id, 24),
        truncate(&restaurant.name, 26),
        truncate(&restaurant.cuisine, 16),
        restaurant.rating,
        restaurant.location
    );
    for url in restaurant.image_urls(asset_origin) {
        println!("{:<26}{url}", "");
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
