//! OceanColor provider support: file name decoding, path mapping, listing
//! queries, and transfers.

pub mod fetch;
pub mod filename;
pub mod handler;
pub mod listing;
pub mod mapper;
pub mod tables;

pub use fetch::{DEFAULT_FETCH_URL, FetchClient};
pub use filename::{ParsedFilename, ProcessingType, Product, parse};
pub use handler::{HANDLER_NAME, OceandataConfig, OceandataHandler};
pub use listing::{DEFAULT_LISTING_URL, ListingClient, RetryPolicy, parse_listing};
pub use mapper::{PROVIDER_HOST, map_locator, map_parsed};
