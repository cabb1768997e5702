pub mod context;
pub mod generate;
pub mod render;
pub mod reports;
pub mod reset;
pub mod status;
