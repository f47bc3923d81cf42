use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    if let Ok(path) = std::env::var("PLACESYNC_CONFIG_DIR") {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path).join("placesync");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/placesync");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("placesync");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Directory holding the Firefox profiles of the current user
pub fn get_firefox_profiles_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = PathBuf::from(std::env::var("APPDATA").ok()?).join("Mozilla\\Firefox\\Profiles");

    #[cfg(target_os = "macos")]
    let base = PathBuf::from(std::env::var("HOME").ok()?)
        .join("Library/Application Support/Firefox/Profiles");

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let base = PathBuf::from(std::env::var("HOME").ok()?).join(".mozilla/firefox");

    Some(base)
}
