pub mod bridge;
pub mod registry;
