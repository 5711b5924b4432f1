//! Location rental marketplace: category taxonomy, listing display helpers,
//! favorites, the map marker pipeline and the HTTP server tying them together.

pub mod catalog;
pub mod display;
pub mod favorites;
pub mod geocoding;
pub mod map;
pub mod models;
pub mod server;
pub mod taxonomy;
