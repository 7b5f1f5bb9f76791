//! Elasticsearch client and operations.

mod bulk;
mod client;
mod schema;
mod search;
mod store;

pub use bulk::{bulk_body, count_failed_items};
pub use client::EsClient;
pub use schema::{ensure_index, load_mapping, result_window_settings};
pub use search::{list_query, nearest_query, parse_hits};
pub use store::EsPlaceStore;
