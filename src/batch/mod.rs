//! Batch lifecycle module: generate and cancel scheduled-send batch ids.
//!
//! A batch id groups scheduled email sends on the provider side so they can be
//! bulk-cancelled before delivery. The id's lifecycle on a client is
//! two-phase: absent until a successful [`BatchClient::generate`], then
//! present and read by [`BatchClient::cancel`]. There is no reset; a new
//! batch means a new client.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchClient`] | Issues the generate and cancel requests and tracks the batch id |
//! | [`BatchClientBuilder`] | Configuration: credentials, endpoint, transport, error policy |
//! | [`Credentials`] | Basic (username + key) vs Bearer (API key) authentication |
//! | [`ApiResponse`] | Normalized status/headers/body returned by operations |
//! | [`BatchGeneration`] | Outcome of a generate call: id (when present) plus response |
//!
//! ## Example
//!
//! ```rust,no_run
//! use sendgrid_batch::BatchClient;
//!
//! # async fn run() -> sendgrid_batch::Result<()> {
//! let mut client = BatchClient::builder()
//!     .api_key("SG.your-key")
//!     .build();
//!
//! let generated = client.generate().await?;
//! // Schedule sends elsewhere with the id, then before dispatch:
//! let cancelled = client.cancel().await?;
//! assert_eq!(cancelled.status, 201);
//! # Ok(())
//! # }
//! ```

mod client;
mod types;

pub use client::{BatchClient, BatchClientBuilder};
pub use types::{ApiResponse, BatchGeneration, Credentials};
