pub mod dense;
pub mod manager;
pub mod structure;

pub use manager::{get_manager, FormatManager, ImportContext, VolumeImporter};
