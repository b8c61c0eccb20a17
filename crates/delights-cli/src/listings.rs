//! Listing command handlers: `add`, `update`, `delete`.

use anyhow::Context;
use delights_api::{ErrorKind, ListingImage, NewListing, RestaurantClient, ServiceError, SessionStore};
use delights_core::AppConfig;

use crate::search::{print_header, print_restaurant};
use crate::ListingArgs;

/// Reads image files named on the command line into a [`NewListing`].
///
/// # Errors
///
/// Returns an error if an image file cannot be read.
pub(crate) fn read_listing(args: ListingArgs) -> anyhow::Result<NewListing> {
    let images = args
        .images
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read image {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("image path {} has no file name", path.display()))?;
            Ok(ListingImage::new(file_name, bytes))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(NewListing {
        name: args.name,
        cuisine: args.cuisine,
        location: args.location,
        rating: args.rating,
        images,
    })
}

/// # Errors
///
/// Returns an error if validation fails or the service rejects the listing.
pub(crate) async fn run_add(
    client: &RestaurantClient,
    session: &SessionStore,
    config: &AppConfig,
    listing: &NewListing,
) -> anyhow::Result<()> {
    let created = client
        .create_restaurant(session, listing)
        .await
        .map_err(listing_error)?;
    println!("restaurant added");
    print_header();
    print_restaurant(&created, &config.asset_origin);
    Ok(())
}

/// # Errors
///
/// Returns an error if validation fails or the service rejects the update.
pub(crate) async fn run_update(
    client: &RestaurantClient,
    session: &SessionStore,
    config: &AppConfig,
    id: &str,
    listing: &NewListing,
) -> anyhow::Result<()> {
    let updated = client
        .update_restaurant(session, id, listing)
        .await
        .map_err(listing_error)?;
    println!("restaurant updated");
    print_header();
    print_restaurant(&updated, &config.asset_origin);
    Ok(())
}

/// # Errors
///
/// Returns an error if the service rejects the deletion.
pub(crate) async fn run_delete(
    client: &RestaurantClient,
    session: &SessionStore,
    id: &str,
) -> anyhow::Result<()> {
    client
        .delete_restaurant(session, id)
        .await
        .map_err(listing_error)?;
    println!("restaurant {} deleted", id.trim());
    Ok(())
}

/// The client has already dropped a rejected session; point at `login`.
fn listing_error(e: ServiceError) -> anyhow::Error {
    if e.kind() == ErrorKind::Unauthorized {
        anyhow::anyhow!(
            "{}; run `delights login`",
            e.display_message().trim_end_matches('.')
        )
    } else {
        anyhow::anyhow!(e.display_message())
    }
}
