//! # sendgrid-batch
//!
//! Client for the SendGrid v3 scheduled-send **batch** lifecycle. A batch is
//! an opaque id that groups scheduled email sends so they can be bulk-cancelled
//! before dispatch; this crate covers exactly the two remote operations that
//! lifecycle needs: generating a batch id and cancelling a batch.
//!
//! ## Overview
//!
//! [`BatchClient`] builds authenticated requests for the two batch endpoints,
//! sends them through an injectable [`transport::Transport`], and interprets
//! each response into either a normalized [`ApiResponse`] or a typed
//! [`Error`]. The batch id returned by a successful generate is cached on the
//! client so a later cancel can use it without the caller threading it through.
//!
//! ## Key Features
//!
//! - **Dual authentication**: HTTP Basic (username + key) or Bearer (API key),
//!   selected once at construction via [`Credentials`]
//! - **Strict or lenient error policy**: non-success statuses either fail with
//!   [`Error::RemoteApi`] (default) or come back as data for the caller to
//!   inspect
//! - **Injectable transport**: tests and embedders can swap the reqwest-backed
//!   default for their own [`transport::Transport`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sendgrid_batch::BatchClient;
//!
//! #[tokio::main]
//! async fn main() -> sendgrid_batch::Result<()> {
//!     let mut client = BatchClient::builder()
//!         .api_key("SG.your-key")
//!         .build();
//!
//!     let generated = client.generate().await?;
//!     println!("batch id: {:?}", generated.batch_id);
//!
//!     // Later, before the scheduled sends go out:
//!     client.cancel().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Batch client, builder, credentials, and response types |
//! | [`transport`] | Transport seam and the reqwest-backed default |
//! | [`error`] | Unified error type |

pub mod batch;
pub mod transport;

// Re-export main types for convenience
pub use batch::{ApiResponse, BatchClient, BatchClientBuilder, BatchGeneration, Credentials};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
