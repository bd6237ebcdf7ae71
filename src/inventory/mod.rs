pub mod fetcher;
pub mod model;
pub mod parser;

use thiserror::Error;

/// Why the host listing could not be produced.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The inventory command is missing or exited nonzero.
    #[error("Inventory unavailable: {0}")]
    Unavailable(String),
    /// The command ran but printed something that isn't an inventory.
    #[error("Couldn't parse inventory output: {0}")]
    Parse(String),
}
