pub mod client;
pub mod error;
pub mod query;
pub mod types;

pub use client::*;
pub use error::*;
pub use query::*;
pub use types::*;
