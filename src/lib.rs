pub mod alpaca;
pub mod config;
pub mod digest;
pub mod error;
pub mod indicator;
pub mod market_data;
pub mod model;
pub mod notify;
pub mod scanner;
pub mod strategy;
pub mod volume_profile;
pub mod yahoo;
