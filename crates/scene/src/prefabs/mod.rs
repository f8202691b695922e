pub mod campus;

pub use campus::*;
