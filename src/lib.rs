//! Fetch a page, save the first image it references, and optionally relay
//! that image to a captioning service and forward the caption.

pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod resolve;
pub mod store;

pub use config::Settings;
pub use error::{ErrorKind, NotifyStage, ScrapeError};
pub use models::{ImageRef, ImageTag, SavedImage};
pub use pipeline::{Pipeline, RunReport};
