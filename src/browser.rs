use crate::places::PLACES_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// A Firefox profile directory holding a bookmark database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirefoxProfile {
    pub name: String,
    pub path: PathBuf,
}

impl FirefoxProfile {
    pub fn places_path(&self) -> PathBuf {
        self.path.join(PLACES_FILE)
    }

    /// Profiles Firefox creates for the release channel end in `.default-release`
    pub fn is_default_release(&self) -> bool {
        self.name.ends_with(".default-release")
    }
}

/// Find every directory under `base` that contains a `places.sqlite`
pub fn detect_firefox_profiles_in(base: &Path) -> Vec<FirefoxProfile> {
    let mut profiles = Vec::new();

    if let Ok(entries) = fs::read_dir(base) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && path.join(PLACES_FILE).exists() {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("Unknown")
                    .to_string();
                profiles.push(FirefoxProfile { name, path });
            }
        }
    }

    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    profiles
}

/// Detect the Firefox profiles of the current user
pub fn detect_firefox_profiles() -> Vec<FirefoxProfile> {
    crate::utils::get_firefox_profiles_dir()
        .map(|base| detect_firefox_profiles_in(&base))
        .unwrap_or_default()
}

/// The profile to read when none is configured: the release profile if there
/// is one, otherwise the first by name
pub fn pick_default_profile(profiles: &[FirefoxProfile]) -> Option<&FirefoxProfile> {
    profiles
        .iter()
        .find(|p| p.is_default_release())
        .or_else(|| profiles.first())
}
