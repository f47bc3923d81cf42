//! Scratch Firefox profile for tests.

use super::PLACES_FILE;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &str = "
CREATE TABLE moz_places (
    id INTEGER PRIMARY KEY,
    url LONGVARCHAR,
    title LONGVARCHAR,
    rev_host LONGVARCHAR,
    visit_count INTEGER DEFAULT 0,
    guid TEXT
);
CREATE TABLE moz_bookmarks (
    id INTEGER PRIMARY KEY,
    type INTEGER,
    fk INTEGER DEFAULT NULL,
    parent INTEGER,
    position INTEGER,
    title LONGVARCHAR,
    keyword_id INTEGER,
    folder_type TEXT,
    dateAdded INTEGER,
    lastModified INTEGER,
    guid TEXT
);
INSERT INTO moz_bookmarks (id, type, parent, position, title, dateAdded, lastModified, guid)
    VALUES (1, 2, 0, 0, '', 0, 0, 'root________');
";

/// A temporary profile directory holding a minimal `places.sqlite`
pub struct PlacesFixture {
    conn: Connection,
    dir: TempDir,
}

impl PlacesFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join(PLACES_FILE)).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self { conn, dir }
    }

    pub fn profile_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join(PLACES_FILE)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn folder(&self, id: i64, parent: i64, title: &str, created: i64, modified: i64, position: i64) {
        self.conn
            .execute(
                "INSERT INTO moz_bookmarks (id, type, parent, position, title, dateAdded, lastModified)
                 VALUES (?1, 2, ?2, ?3, ?4, ?5, ?6)",
                (id, parent, position, title, created, modified),
            )
            .unwrap();
    }

    pub fn link(&self, id: i64, parent: i64, url: &str, title: &str, created: i64, position: i64) {
        self.conn
            .execute(
                "INSERT INTO moz_places (id, url, title) VALUES (?1, ?2, ?3)",
                (id, url, title),
            )
            .unwrap();
        self.conn
            .execute(
                "INSERT INTO moz_bookmarks (id, type, fk, parent, position, title, dateAdded, lastModified)
                 VALUES (?1, 1, ?1, ?2, ?3, ?4, ?5, ?5)",
                (id, parent, position, title, created),
            )
            .unwrap();
    }

    pub fn separator(&self, id: i64, parent: i64, position: i64) {
        self.conn
            .execute(
                "INSERT INTO moz_bookmarks (id, type, parent, position) VALUES (?1, 3, ?2, ?3)",
                (id, parent, position),
            )
            .unwrap();
    }
}
