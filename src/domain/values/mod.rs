pub mod parser;
pub mod price;
pub mod trigger;
