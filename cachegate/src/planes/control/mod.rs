mod registry;

pub use registry::GatewayRegistry;
