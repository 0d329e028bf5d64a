//! Writing files where the game will find them.
//!
//! [`Destination`] is the capability the collection builder uses to drop
//! beatmap-set archives into the game's `Songs` directory, and
//! [`replace_with_backup`] is how the merged collection database lands on
//! disk without losing the previous copy.

pub mod backend;
pub mod error;
mod path;
mod replace;

pub use crate::backend::{Destination, LocalDestination};
pub use crate::path::validate as validate_path;
pub use crate::replace::{BACKUP_EXTENSION, backup_path, replace_with_backup};
use std::sync::Arc;

pub type DestinationHandle = Arc<dyn Destination>;
