//! Mediabot-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across mediabot:
//!
//! - **Typed IDs**: Newtype wrappers for forum topic, post and category IDs
//! - **Core Types**: Media types, catalog services, content sources and lookup requests
//! - **Error Handling**: The lookup error taxonomy and result alias
//! - **Clock**: Injectable time source for TTLs, rate windows and log buckets
//!
//! # Examples
//!
//! ```
//! use mediabot_common::{Error, LookupRequest, MediaType, Result, Service};
//!
//! let request = LookupRequest::new(MediaType::Movie, "The Iron Claw", Some(2023), "en-US");
//! assert_eq!(request.media_type.service(), Service::Tmdb);
//!
//! fn example() -> Result<()> {
//!     Err(Error::validation("title must not be blank"))
//! }
//! assert!(example().is_err());
//! ```

pub mod clock;
pub mod content;
pub mod error;
pub mod ids;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::{ContentKind, ContentRef, ContentSource, PostContent, TopicContent};
pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use types::*;
