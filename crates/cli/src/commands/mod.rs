pub mod graph;
pub mod invoke;
pub mod list;
pub mod platform;
pub mod schema;
