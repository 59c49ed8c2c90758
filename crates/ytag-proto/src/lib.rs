//! Wire types and clients for the ytag conversion backend.

pub mod client;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod status;
pub mod video;
