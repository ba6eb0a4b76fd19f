//! # multiverse-api
//!
//! Typed client for the public Rick and Morty REST API.
//!
//! ## Features
//!
//! - **Models**: characters, episodes and the paginated list envelope
//! - **Filters**: value-comparable filter sets for the list endpoints
//! - **Pagination**: page-number extraction from `next`/`prev` links
//!
//! ## Quick Start
//!
//! ```ignore
//! use multiverse_api::{ApiClient, CharacterFilters};
//!
//! let client = ApiClient::new()?;
//! let page = client.characters(&CharacterFilters::new().with_name("rick"), 1).await?;
//! println!("{} matches, next page: {:?}", page.info.count, page.info.next_page());
//! ```
//!
//! Retries, rate limiting and timeouts are left to `reqwest` defaults.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod filters;
pub mod model;
pub mod pagination;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use filters::{CharacterFilters, EpisodeFilters};
pub use model::{Character, CharacterLocation, CharacterStatus, Episode, Gender, Page, PageInfo};
pub use pagination::page_from_link;
