pub mod catalog_repo;
pub mod migrations;
pub mod price_repo;
