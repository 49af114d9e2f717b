pub mod chart;
pub mod types;

pub use chart::YahooChartClient;
