//! CLI command implementations

pub mod cache;
pub mod config;
pub mod materialize;
pub mod path;
pub mod run;

pub use cache::execute as cache;
pub use config::execute as config;
pub use materialize::execute as materialize;
pub use path::execute as path;
pub use run::execute as run;

use crate::error::{EmbedbinError, EmbedbinResult};
use std::path::Path;

/// Read the bytes of the binary to materialize
async fn read_binary(file: &Path) -> EmbedbinResult<Vec<u8>> {
    tokio::fs::read(file)
        .await
        .map_err(|e| EmbedbinError::io(format!("reading binary {}", file.display()), e))
}
