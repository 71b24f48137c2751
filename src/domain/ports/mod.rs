pub mod catalog_store;
pub mod price_store;
pub mod source_fetcher;
