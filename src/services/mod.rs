pub mod book_search;
pub mod pool;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod scoring;
pub mod shelf;
pub mod sourcing;
pub mod store;

pub use recommendations::{ReaderStores, RecommendationEngine, RecommendationQuery};
