pub mod catalog;
pub mod fetch_run;
pub mod price_record;
pub mod raw_item;
