use serde::{Deserialize, Serialize};

/// Kind of a row in the bookmark store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    Link,
}

impl EntryKind {
    /// Value of the `moz_bookmarks.type` column for this kind
    pub fn type_code(self) -> i64 {
        match self {
            EntryKind::Link => 1,
            EntryKind::Folder => 2,
        }
    }
}

/// Attributes of one child row as returned by a storage reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub title: String,
    pub url: Option<String>,
    pub created: i64,
    pub modified: i64,
    pub position: i64,
}

/// A link inside a folder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkEntry {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub created: i64,
    pub modified: i64,
    pub position: i64,
}

impl BookmarkEntry {
    pub fn new(id: i64, url: String, title: String, created: i64, modified: i64, position: i64) -> Self {
        Self {
            id,
            title,
            url,
            created,
            modified,
            position,
        }
    }
}

/// A folder with its resolved bookmarks and subfolders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderNode {
    pub id: i64,
    pub title: String,
    pub created: i64,
    pub modified: i64,
    pub position: i64,
    /// Child links, in the order the reader returned them
    pub bookmarks: Vec<BookmarkEntry>,
    /// Child folders, in construction order (ascending position)
    pub folders: Vec<FolderNode>,
}

impl FolderNode {
    pub fn new(id: i64, title: String, created: i64, modified: i64, position: i64) -> Self {
        Self {
            id,
            title,
            created,
            modified,
            position,
            bookmarks: Vec::new(),
            folders: Vec::new(),
        }
    }

    /// Create an empty folder from a reader row
    pub fn from_record(id: i64, record: NodeRecord) -> Self {
        Self::new(
            id,
            record.title,
            record.created,
            record.modified,
            record.position,
        )
    }

    pub fn bookmark(&self, id: i64) -> Option<&BookmarkEntry> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn folder(&self, id: i64) -> Option<&FolderNode> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Child links sorted ascending by position.
    ///
    /// The sort is stable, so links sharing a position keep their stored order.
    pub fn sorted_bookmarks(&self) -> Vec<&BookmarkEntry> {
        let mut sorted: Vec<&BookmarkEntry> = self.bookmarks.iter().collect();
        sorted.sort_by_key(|b| b.position);
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.folders.is_empty()
    }

    /// Number of folders in this subtree, this one included
    pub fn folder_count(&self) -> usize {
        1 + self.folders.iter().map(FolderNode::folder_count).sum::<usize>()
    }

    /// Number of links in this subtree
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
            + self
                .folders
                .iter()
                .map(FolderNode::bookmark_count)
                .sum::<usize>()
    }
}

/// The forest of root-level folders produced by one extraction run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkTree {
    pub folders: Vec<FolderNode>,
}

impl BookmarkTree {
    pub fn new(folders: Vec<FolderNode>) -> Self {
        Self { folders }
    }

    pub fn folder_count(&self) -> usize {
        self.folders.iter().map(FolderNode::folder_count).sum()
    }

    pub fn bookmark_count(&self) -> usize {
        self.folders.iter().map(FolderNode::bookmark_count).sum()
    }
}
