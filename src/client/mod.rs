//! Top-level client: one transport shared by every resource.

mod builder;
mod core;

pub use builder::MerlinClientBuilder;
pub use core::MerlinClient;
