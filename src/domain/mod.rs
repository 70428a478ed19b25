pub mod controller_registry;
pub mod endpoints_controller;
