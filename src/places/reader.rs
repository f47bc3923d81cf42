use crate::error::{PlacesyncError, Result};
use crate::models::{EntryKind, NodeRecord};
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Source of direct children of a node, filtered by kind.
///
/// Iteration order of the returned map carries no sibling order; callers
/// re-derive order from `NodeRecord::position`. Identifier 0 is never returned.
pub trait StorageReader {
    fn children(&self, parent: i64, kind: EntryKind) -> Result<BTreeMap<i64, NodeRecord>>;
}

const BOOKMARK_COLUMNS: &[&str] = &[
    "id",
    "type",
    "fk",
    "parent",
    "position",
    "title",
    "dateAdded",
    "lastModified",
];

const PLACE_COLUMNS: &[&str] = &["id", "url"];

const CHILDREN_SQL: &str = "SELECT b.id, b.title, p.url, b.dateAdded, b.lastModified, b.position
     FROM moz_bookmarks AS b
     LEFT JOIN moz_places AS p ON b.fk = p.id
     WHERE b.parent = ?1 AND b.type = ?2 AND b.id != 0";

/// Storage reader over a Firefox `places.sqlite` connection
pub struct PlacesReader<'a> {
    conn: &'a Connection,
}

impl<'a> PlacesReader<'a> {
    /// Wrap a connection after checking it carries the bookmark tables
    pub fn new(conn: &'a Connection) -> Result<Self> {
        verify_table(conn, "moz_bookmarks", BOOKMARK_COLUMNS)?;
        verify_table(conn, "moz_places", PLACE_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Title of a single row, or `None` when no such row exists
    pub fn title_of(&self, id: i64) -> Result<Option<String>> {
        let title = self
            .conn
            .query_row(
                "SELECT title FROM moz_bookmarks WHERE id = ?1",
                [id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(title.map(Option::unwrap_or_default))
    }
}

impl StorageReader for PlacesReader<'_> {
    fn children(&self, parent: i64, kind: EntryKind) -> Result<BTreeMap<i64, NodeRecord>> {
        let mut stmt = self.conn.prepare_cached(CHILDREN_SQL)?;
        let rows = stmt.query_map((parent, kind.type_code()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                NodeRecord {
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    url: row.get(2)?,
                    created: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                    modified: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                    position: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                },
            ))
        })?;

        let mut children = BTreeMap::new();
        for row in rows {
            let (id, record) = row?;
            if kind == EntryKind::Link && record.url.is_none() {
                return Err(PlacesyncError::SourceSchemaMismatch(format!(
                    "bookmark {} has no URL",
                    id
                )));
            }
            children.insert(id, record);
        }

        Ok(children)
    }
}

fn verify_table(conn: &Connection, table: &str, required: &[&str]) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(PlacesyncError::SourceSchemaMismatch(format!(
            "table {} is missing",
            table
        )));
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !columns.iter().any(|c| c.as_str() == *col))
        .collect();

    if !missing.is_empty() {
        return Err(PlacesyncError::SourceSchemaMismatch(format!(
            "table {} lacks columns: {}",
            table,
            missing.join(", ")
        )));
    }

    Ok(())
}
