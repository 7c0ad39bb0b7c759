//! niconico watch API

pub mod client;
pub mod error;
pub mod id;
pub mod schema;
pub mod service;
pub mod types;
pub mod watch_url;

pub use client::NicovideoClient;
pub use error::NicovideoError;
