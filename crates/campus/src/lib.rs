//! Place-interaction workflow for the campus map.
//!
//! [`Campus`] owns the application state (destination, ad-hoc marker, open
//! info panel, rendered route) and drives it from user events. The map, the
//! DOM and every remote service are reached through the traits in
//! [`surface`] and [`providers`], so the whole workflow runs on the host in
//! tests and in the browser unchanged.

pub mod buildings;
pub mod config;
pub mod controller;
pub mod error;
pub mod markers;
pub mod providers;
pub mod route;
pub mod search;
pub mod state;
pub mod surface;
pub mod viewer;

#[cfg(test)]
mod mock;

pub use buildings::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use markers::*;
pub use providers::*;
pub use route::*;
pub use search::*;
pub use state::*;
pub use surface::*;
