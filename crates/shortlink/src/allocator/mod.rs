mod allocate;
mod config;
mod context;

pub use allocate::*;
pub use config::*;
pub use context::*;
