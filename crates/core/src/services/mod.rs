pub mod auth_service;
pub mod chart_service;
pub mod currency_service;
pub mod organization_service;
pub mod period_service;
pub mod statistics_service;
pub mod synthesis;
