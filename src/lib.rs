//! embedbin - run executables embedded in a program
//!
//! Materializes embedded binary payloads into a content-addressed cache
//! directory and builds `tokio` commands for them.
//!
//! ```rust,ignore
//! use embedbin::Launcher;
//! use tokio_util::sync::CancellationToken;
//!
//! static HELLO: &[u8] = include_bytes!("../assets/hello");
//!
//! let launcher = Launcher::new("hello", HELLO);
//! let output = launcher.command(CancellationToken::new(), ["--greet"])?.output().await?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod materialize;
pub mod ui;

pub use error::{CacheFileError, EmbedbinError, EmbedbinResult};
pub use launcher::{EmbeddedCommand, Launcher};
pub use materialize::{Materialize, Materialized, Materializer, Outcome, Payload};
