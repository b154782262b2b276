//! Real-estate marketplace core: listing search, map geometry, mortgage math,
//! i18n, comparison and toast state, and a client for the hosted backend that
//! owns auth, favorites, saved searches and avatars.

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod i18n;
pub mod map;
pub mod models;
pub mod mortgage;
pub mod reporting;
pub mod search;
pub mod toast;

pub use auth::{AuthContext, AuthError, AuthEvent};
pub use backend::{connect, Backend, BackendError};
pub use config::{BackendMode, Config};
pub use models::{Agent, ListingType, Property, PropertyType};
pub use search::{search_properties, SearchFilters, SortBy};
