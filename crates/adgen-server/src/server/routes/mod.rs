pub mod default;
pub mod generate;
pub mod results;
