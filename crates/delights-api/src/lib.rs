pub mod client;
pub mod error;
pub mod normalize;
pub mod session;
pub mod types;

pub use client::{RestaurantClient, RestaurantSearch};
pub use error::{ErrorKind, ServiceError, SessionError};
pub use normalize::{normalize_restaurant, normalize_restaurants};
pub use session::SessionStore;
pub use types::{ListingImage, NewAccount, NewListing, RawRestaurant, SearchPage, SearchRequest};
