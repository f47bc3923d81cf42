use super::reader::PlacesReader;
use super::PLACES_FILE;
use crate::error::{PlacesyncError, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Private copy of a profile's `places.sqlite`.
///
/// The browser keeps the live database locked while running, so reads go
/// through a copy taken up front. The copy is deleted on drop.
pub struct PlacesSnapshot {
    // Declared before `dir` so the connection closes before the directory is removed.
    conn: Connection,
    dir: TempDir,
    source: PathBuf,
}

impl PlacesSnapshot {
    pub fn take(profile_dir: &Path) -> Result<Self> {
        let source = profile_dir.join(PLACES_FILE);
        if !source.is_file() {
            return Err(PlacesyncError::unavailable(&source, "file not found"));
        }

        let dir = tempfile::Builder::new()
            .prefix("placesync-")
            .tempdir()
            .map_err(|e| PlacesyncError::unavailable(&source, e))?;
        let copy = dir.path().join(PLACES_FILE);

        fs::copy(&source, &copy).map_err(|e| PlacesyncError::unavailable(&source, e))?;

        // Recent writes may still live in the write-ahead log.
        let wal = profile_dir.join(format!("{}-wal", PLACES_FILE));
        if wal.is_file() {
            let wal_copy = dir.path().join(format!("{}-wal", PLACES_FILE));
            fs::copy(&wal, &wal_copy).map_err(|e| PlacesyncError::unavailable(&wal, e))?;
            debug!("Copied write-ahead log {:?}", wal);
        }

        let conn = Connection::open(&copy).map_err(|e| PlacesyncError::unavailable(&source, e))?;

        let check: String = conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(|e| PlacesyncError::unavailable(&source, e))?;
        if check != "ok" {
            return Err(PlacesyncError::unavailable(
                &source,
                format!("integrity check failed: {}", check),
            ));
        }

        info!("Took snapshot of {:?}", source);

        Ok(Self { conn, dir, source })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn reader(&self) -> Result<PlacesReader<'_>> {
        PlacesReader::new(&self.conn)
    }

    /// The live database this snapshot was copied from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join(PLACES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::fixture::PlacesFixture;

    #[test]
    fn test_snapshot_reads_copy() {
        let fx = PlacesFixture::new();
        fx.folder(2, 1, "Work", 1000, 2000, 0);

        let snapshot = PlacesSnapshot::take(fx.profile_dir()).unwrap();
        assert_eq!(snapshot.source(), fx.db_path());
        assert_ne!(snapshot.path(), fx.db_path());

        // Writes to the live store after the snapshot are not visible
        fx.folder(3, 1, "Later", 0, 0, 1);
        let count: i64 = snapshot
            .connection()
            .query_row("SELECT COUNT(*) FROM moz_bookmarks WHERE parent = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_snapshot_removed_on_drop() {
        let fx = PlacesFixture::new();
        let snapshot = PlacesSnapshot::take(fx.profile_dir()).unwrap();
        let copy = snapshot.path();
        assert!(copy.exists());

        drop(snapshot);
        assert!(!copy.exists());
        assert!(fx.db_path().exists());
    }

    #[test]
    fn test_missing_profile_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlacesSnapshot::take(&dir.path().join("no-such-profile"));
        assert!(matches!(
            result,
            Err(PlacesyncError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_garbage_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PLACES_FILE), "not a database\n".repeat(100)).unwrap();

        let result = PlacesSnapshot::take(dir.path());
        assert!(matches!(
            result,
            Err(PlacesyncError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_snapshot_without_bookmark_tables_fails_on_reader() {
        let dir = tempfile::tempdir().unwrap();
        {
            let conn = Connection::open(dir.path().join(PLACES_FILE)).unwrap();
            conn.execute("CREATE TABLE unrelated (id INTEGER)", []).unwrap();
        }

        let snapshot = PlacesSnapshot::take(dir.path()).unwrap();
        assert!(matches!(
            snapshot.reader(),
            Err(PlacesyncError::SourceSchemaMismatch(_))
        ));
    }
}
