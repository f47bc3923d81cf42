pub mod reader;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod fixture;

pub use reader::{PlacesReader, StorageReader};
pub use snapshot::PlacesSnapshot;

use crate::error::Result;
use crate::import_export::BookmarkSource;
use crate::models::BookmarkTree;
use crate::tree::TreeBuilder;
use log::warn;
use std::path::{Path, PathBuf};

/// File name of the bookmark database inside a Firefox profile
pub const PLACES_FILE: &str = "places.sqlite";

/// Identifier of the places root folder
pub const ROOT_ID: i64 = 1;

/// Bookmark source reading a Firefox profile through a snapshot
pub struct PlacesSource {
    profile_dir: PathBuf,
    root_id: i64,
}

impl PlacesSource {
    pub fn new(profile_dir: impl Into<PathBuf>, root_id: i64) -> Self {
        Self {
            profile_dir: profile_dir.into(),
            root_id,
        }
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }
}

impl BookmarkSource for PlacesSource {
    fn load(&self) -> Result<BookmarkTree> {
        // The snapshot is dropped, and its copy removed, once the tree is built.
        let snapshot = PlacesSnapshot::take(&self.profile_dir)?;
        let reader = snapshot.reader()?;
        if reader.title_of(self.root_id)?.is_none() {
            warn!(
                "Root folder {} not found in {:?}",
                self.root_id,
                snapshot.source()
            );
        }
        let tree = TreeBuilder::new(&reader, self.root_id).build()?;
        Ok(tree)
    }
}
