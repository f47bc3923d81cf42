use crate::error::{PlacesyncError, Result};
use crate::models::{BookmarkEntry, BookmarkTree, EntryKind, FolderNode, NodeRecord};
use crate::places::StorageReader;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Builds the folder forest below a root by walking a `StorageReader`.
///
/// The walk keeps an explicit worklist and a parent map, so nesting depth is
/// not limited by the call stack and a folder that shows up as its own
/// ancestor is reported instead of looped on.
pub struct TreeBuilder<'r, R: StorageReader + ?Sized> {
    reader: &'r R,
    root_id: i64,
}

/// A folder whose bookmarks are read but whose subfolders are not yet attached
struct Pending {
    node: FolderNode,
    children: Vec<i64>,
}

impl<'r, R: StorageReader + ?Sized> TreeBuilder<'r, R> {
    pub fn new(reader: &'r R, root_id: i64) -> Self {
        Self { reader, root_id }
    }

    pub fn build(&self) -> Result<BookmarkTree> {
        let mut seen: HashSet<i64> = HashSet::from([self.root_id]);
        let mut parent_of: HashMap<i64, i64> = HashMap::new();
        let mut pending: HashMap<i64, Pending> = HashMap::new();
        let mut discovered: Vec<i64> = Vec::new();
        let mut worklist: Vec<i64> = Vec::new();

        let top = self.child_folders(self.root_id)?;
        let mut roots = Vec::with_capacity(top.len());
        for (id, record) in top {
            self.admit(id, self.root_id, &seen, &parent_of)?;
            seen.insert(id);
            parent_of.insert(id, self.root_id);
            pending.insert(
                id,
                Pending {
                    node: FolderNode::from_record(id, record),
                    children: Vec::new(),
                },
            );
            discovered.push(id);
            roots.push(id);
        }
        worklist.extend(roots.iter().rev());

        while let Some(folder_id) = worklist.pop() {
            let links = self.reader.children(folder_id, EntryKind::Link)?;
            let mut bookmarks = Vec::with_capacity(links.len());
            for (id, record) in links {
                if !seen.insert(id) {
                    return Err(PlacesyncError::DuplicateIdentifier(id));
                }
                bookmarks.push(bookmark_from_record(id, record)?);
            }

            let subfolders = self.child_folders(folder_id)?;
            let mut children = Vec::with_capacity(subfolders.len());
            for (id, record) in subfolders {
                self.admit(id, folder_id, &seen, &parent_of)?;
                seen.insert(id);
                parent_of.insert(id, folder_id);
                pending.insert(
                    id,
                    Pending {
                        node: FolderNode::from_record(id, record),
                        children: Vec::new(),
                    },
                );
                discovered.push(id);
                children.push(id);
            }

            if let Some(entry) = pending.get_mut(&folder_id) {
                debug!(
                    "Folder {} ({:?}): {} bookmarks, {} subfolders",
                    folder_id,
                    entry.node.title,
                    bookmarks.len(),
                    children.len()
                );
                worklist.extend(children.iter().rev());
                entry.node.bookmarks = bookmarks;
                entry.children = children;
            }
        }

        // Children are always discovered after their parent, so walking the
        // discovery order backwards finishes every subfolder before its parent.
        let mut finished: HashMap<i64, FolderNode> = HashMap::with_capacity(discovered.len());
        for id in discovered.iter().rev() {
            if let Some(Pending { mut node, children }) = pending.remove(id) {
                node.folders = children
                    .iter()
                    .filter_map(|child| finished.remove(child))
                    .collect();
                finished.insert(*id, node);
            }
        }

        let folders: Vec<FolderNode> = roots
            .iter()
            .filter_map(|id| finished.remove(id))
            .collect();
        let tree = BookmarkTree::new(folders);

        info!(
            "Built bookmark tree below {}: {} folders, {} bookmarks",
            self.root_id,
            tree.folder_count(),
            tree.bookmark_count()
        );

        Ok(tree)
    }

    /// Child folders of `parent` in construction order (ascending position)
    fn child_folders(&self, parent: i64) -> Result<Vec<(i64, NodeRecord)>> {
        let mut folders: Vec<(i64, NodeRecord)> = self
            .reader
            .children(parent, EntryKind::Folder)?
            .into_iter()
            .collect();
        folders.sort_by_key(|(_, record)| record.position);
        Ok(folders)
    }

    /// Reject a folder that is an ancestor of `parent` or was already placed
    fn admit(
        &self,
        id: i64,
        parent: i64,
        seen: &HashSet<i64>,
        parent_of: &HashMap<i64, i64>,
    ) -> Result<()> {
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(PlacesyncError::CycleDetected(id));
            }
            cursor = parent_of.get(&ancestor).copied();
        }

        if seen.contains(&id) {
            return Err(PlacesyncError::DuplicateIdentifier(id));
        }

        Ok(())
    }
}

fn bookmark_from_record(id: i64, record: NodeRecord) -> Result<BookmarkEntry> {
    let url = record.url.ok_or_else(|| {
        PlacesyncError::SourceSchemaMismatch(format!("bookmark {} has no URL", id))
    })?;
    Ok(BookmarkEntry::new(
        id,
        url,
        record.title,
        record.created,
        record.modified,
        record.position,
    ))
}

/// Build the tree below `root_id`
pub fn build_tree<R: StorageReader + ?Sized>(reader: &R, root_id: i64) -> Result<BookmarkTree> {
    TreeBuilder::new(reader, root_id).build()
}
