pub mod app_config;
pub mod rest_gateway;

pub use app_config::Config;
pub use rest_gateway::RestGateway;
