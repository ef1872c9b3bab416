pub mod chart;
pub mod organization;
pub mod period;
pub mod settings;
pub mod statistics;
pub mod user;
