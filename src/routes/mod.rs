pub mod default_route;
pub mod notify_route;
