pub mod artifact;
pub mod config;
pub mod invoker;

pub use artifact::*;
pub use config::*;
pub use invoker::*;
