pub mod config;
pub mod host;
pub mod renderer;

pub use config::*;
pub use host::*;
pub use renderer::*;
