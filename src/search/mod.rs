pub mod agents;
pub mod filters;
pub mod format;
pub mod types;

pub use agents::{agents_from_properties, filter_agents, listings_by_agent, AgentQuery};
pub use filters::{featured, filter_properties, search_properties, similar_properties, sort_properties};
pub use format::{format_area, format_price, format_property_price, price_per_area};
pub use types::{SearchFilters, SortBy};
