pub mod client;
pub mod config;
pub mod csrf;
pub mod curator;
pub mod error;
pub mod model;
#[cfg(feature = "native")]
pub mod native;
pub mod pages;
pub mod params;
pub mod session;

#[cfg(test)]
mod testing;

pub use client::{MoodyTunesClient, Transport};
pub use config::PageConfig;
pub use error::ApiError;
