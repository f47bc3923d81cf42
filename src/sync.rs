use crate::browser;
use crate::config::Config;
use crate::error::{PlacesyncError, Result};
use crate::import_export::{BookmarkSink, BookmarkSource, FileSink};
use crate::models::BookmarkTree;
use crate::places::PlacesSource;
use log::info;
use std::path::PathBuf;

/// What one run wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub folders: usize,
    pub bookmarks: usize,
}

impl RunSummary {
    fn of(tree: &BookmarkTree) -> Self {
        Self {
            folders: tree.folder_count(),
            bookmarks: tree.bookmark_count(),
        }
    }
}

/// Copy a tree from any source to any sink
pub fn transfer(source: &dyn BookmarkSource, sink: &dyn BookmarkSink) -> Result<RunSummary> {
    let tree = source.load()?;
    sink.store(&tree)?;
    Ok(RunSummary::of(&tree))
}

/// Extracts a Firefox profile's bookmarks and writes them out, driven by `Config`
pub struct Synchronizer {
    config: Config,
}

impl Synchronizer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured profile, or the detected default one
    pub fn profile_dir(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.profile_path {
            return Ok(path.clone());
        }

        let profiles = browser::detect_firefox_profiles();
        match browser::pick_default_profile(&profiles) {
            Some(profile) => {
                info!("Using detected Firefox profile {}", profile.name);
                Ok(profile.path.clone())
            }
            None => Err(PlacesyncError::unavailable(
                crate::utils::get_firefox_profiles_dir().unwrap_or_default(),
                "no Firefox profile found",
            )),
        }
    }

    pub fn source(&self) -> Result<PlacesSource> {
        Ok(PlacesSource::new(self.profile_dir()?, self.config.root_id))
    }

    pub fn sink(&self) -> Result<FileSink> {
        FileSink::for_path(&self.config.output_path, self.config.timestamps)
    }

    /// Read the bookmark tree from the profile
    pub fn extract(&self) -> Result<BookmarkTree> {
        self.source()?.load()
    }

    /// Write a tree to the configured output
    pub fn export(&self, tree: &BookmarkTree) -> Result<()> {
        self.sink()?.store(tree)
    }

    /// Extract then export; nothing is written unless extraction succeeds
    pub fn run(&self) -> Result<RunSummary> {
        // Resolve the sink first so an unsupported output fails before any read.
        let sink = self.sink()?;
        let source = self.source()?;
        info!(
            "Exporting bookmarks from {:?} to {:?}",
            source.profile_dir(),
            sink.path()
        );
        transfer(&source, &sink)
    }
}
