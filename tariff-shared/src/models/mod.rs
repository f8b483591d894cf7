pub mod chart;
pub mod groups;
pub mod messages;
pub mod params;
pub mod rates;
pub mod results;
