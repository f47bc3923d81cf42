use super::BookmarkSource;
use crate::error::{PlacesyncError, Result};
use crate::models::{BookmarkEntry, BookmarkTree, FolderNode};
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn folder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^<DT><H3\b([^>]*)>(.*?)</H3>").unwrap())
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^<DT><A\b([^>]*)>(.*?)</A>").unwrap())
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([A-Za-z_]+)\s*=\s*"([^"]*)""#).unwrap())
}

/// Identifier handed to the first parsed node; 1 stands for the implicit root
const FIRST_ID: i64 = 2;

/// Reads a Netscape Bookmark File back into a tree.
///
/// Works line by line, which is how browsers and this crate lay the format
/// out. Parsed nodes get fresh identifiers and their sibling index as position.
pub struct NetscapeParser {
    next_id: i64,
    roots: Vec<FolderNode>,
    open: Vec<FolderNode>,
    header: Option<FolderNode>,
    outer_open: bool,
    skipped: usize,
}

impl NetscapeParser {
    pub fn new() -> Self {
        Self {
            next_id: FIRST_ID,
            roots: Vec::new(),
            open: Vec::new(),
            header: None,
            outer_open: false,
            skipped: 0,
        }
    }

    pub fn parse(mut self, html: &str) -> Result<BookmarkTree> {
        if !html.to_uppercase().contains("<!DOCTYPE NETSCAPE-BOOKMARK-FILE-1>") {
            return Err(PlacesyncError::HtmlParse(
                "missing NETSCAPE-Bookmark-file-1 doctype".to_string(),
            ));
        }

        for (lineno, line) in html.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = folder_re().captures(line) {
                self.close_header();
                let attrs = &caps[1];
                let mut folder = FolderNode::new(
                    self.take_id(),
                    unescape_html(&caps[2]),
                    attr_i64(attrs, "ADD_DATE"),
                    attr_i64(attrs, "LAST_MODIFIED"),
                    0,
                );
                folder.position = self.sibling_count() as i64;
                self.header = Some(folder);
            } else if let Some(caps) = link_re().captures(line) {
                self.close_header();
                let attrs = &caps[1];
                let Some(href) = attr(attrs, "HREF") else {
                    warn!("Line {}: link without HREF skipped", lineno + 1);
                    self.skipped += 1;
                    continue;
                };
                let id = self.take_id();
                let title = unescape_html(&caps[2]);
                match self.open.last_mut() {
                    Some(parent) => {
                        let position = (parent.folders.len() + parent.bookmarks.len()) as i64;
                        parent.bookmarks.push(BookmarkEntry::new(
                            id,
                            unescape_html(href),
                            title,
                            attr_i64(attrs, "ADD_DATE"),
                            attr_i64(attrs, "LAST_MODIFIED"),
                            position,
                        ));
                    }
                    None => {
                        warn!("Line {}: link {:?} outside any folder skipped", lineno + 1, title);
                        self.skipped += 1;
                    }
                }
            } else if starts_with_tag(line, "<DL") {
                match self.header.take() {
                    Some(folder) => self.open.push(folder),
                    None if !self.outer_open && self.open.is_empty() => self.outer_open = true,
                    None => {
                        return Err(PlacesyncError::HtmlParse(format!(
                            "line {}: list without folder header",
                            lineno + 1
                        )))
                    }
                }
            } else if starts_with_tag(line, "</DL") {
                self.close_header();
                match self.open.pop() {
                    Some(folder) => self.attach(folder),
                    None if self.outer_open => self.outer_open = false,
                    None => {
                        return Err(PlacesyncError::HtmlParse(format!(
                            "line {}: unbalanced </DL>",
                            lineno + 1
                        )))
                    }
                }
            }
        }

        self.close_header();
        if !self.open.is_empty() {
            return Err(PlacesyncError::HtmlParse(format!(
                "{} folder(s) left open at end of file",
                self.open.len()
            )));
        }

        let tree = BookmarkTree::new(self.roots);
        debug!(
            "Parsed {} folders and {} bookmarks ({} skipped)",
            tree.folder_count(),
            tree.bookmark_count(),
            self.skipped
        );
        Ok(tree)
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn sibling_count(&self) -> usize {
        match self.open.last() {
            Some(parent) => parent.folders.len() + parent.bookmarks.len(),
            None => self.roots.len(),
        }
    }

    /// A folder header never followed by a list is an empty folder
    fn close_header(&mut self) {
        if let Some(folder) = self.header.take() {
            self.attach(folder);
        }
    }

    fn attach(&mut self, folder: FolderNode) {
        match self.open.last_mut() {
            Some(parent) => parent.folders.push(folder),
            None => self.roots.push(folder),
        }
    }
}

fn starts_with_tag(line: &str, tag: &str) -> bool {
    line.get(..tag.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(tag))
}

fn attr<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    attr_re()
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

fn attr_i64(attrs: &str, name: &str) -> i64 {
    attr(attrs, name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

impl Default for NetscapeParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo the entity escaping applied on export
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#10;", "\n")
        .replace("&#13;", "\r")
        .replace("&amp;", "&")
}

/// Parse a Netscape bookmark document
pub fn parse_netscape(html: &str) -> Result<BookmarkTree> {
    NetscapeParser::new().parse(html)
}

/// Bookmark source reading a Netscape bookmark file
pub struct HtmlFileSource {
    path: PathBuf,
}

impl HtmlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkSource for HtmlFileSource {
    fn load(&self) -> Result<BookmarkTree> {
        let html = std::fs::read_to_string(&self.path)
            .map_err(|e| PlacesyncError::unavailable(&self.path, e))?;
        parse_netscape(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import_export::{render_html, TimestampFormat};
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_html(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_nested_folders() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3 ADD_DATE="10" LAST_MODIFIED="20">Programming</H3>
    <DL><p>
        <DT><H3>Rust</H3>
        <DL><p>
            <DT><A HREF="https://rust-lang.org" ADD_DATE="30">Rust Lang</A>
        </DL><p>
        <DT><A HREF="https://go.dev">Go</A>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        assert_eq!(tree.folders.len(), 1);
        let programming = &tree.folders[0];
        assert_eq!(programming.title, "Programming");
        assert_eq!((programming.created, programming.modified), (10, 20));
        assert_eq!(programming.folders.len(), 1);
        assert_eq!(programming.bookmarks.len(), 1);
        assert_eq!(programming.bookmarks[0].url, "https://go.dev");
        assert_eq!(programming.bookmarks[0].position, 1);

        let rust = &programming.folders[0];
        assert_eq!(rust.title, "Rust");
        assert_eq!(rust.position, 0);
        assert_eq!(rust.bookmarks[0].title, "Rust Lang");
        assert_eq!(rust.bookmarks[0].created, 30);
    }

    #[test]
    fn test_parse_chrome_format() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1234567890" LAST_MODIFIED="1234567891" PERSONAL_TOOLBAR_FOLDER="true">Bookmarks bar</H3>
    <DL><p>
        <DT><A HREF="https://github.com" ADD_DATE="1234567890" ICON="data:image/png;base64,iVBOR...">GitHub</A>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        let bar = &tree.folders[0];
        assert_eq!(bar.title, "Bookmarks bar");
        assert_eq!(bar.created, 1234567890);
        assert_eq!(bar.bookmarks[0].url, "https://github.com");
        assert_eq!(bar.bookmarks[0].title, "GitHub");
    }

    #[test]
    fn test_parse_lowercase_tags() {
        let html = r#"<!doctype netscape-bookmark-file-1>
<dl><p>
    <dt><h3 add_date="1">Work</h3>
    <dl><p>
        <dt><a href="https://example.com">Example</a>
    </dl><p>
</dl><p>"#;

        let tree = parse_netscape(html).unwrap();
        assert_eq!(tree.folders[0].title, "Work");
        assert_eq!(tree.folders[0].created, 1);
        assert_eq!(tree.folders[0].bookmarks[0].url, "https://example.com");
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>R&amp;D &lt;lab&gt;</H3>
    <DL><p>
        <DT><A HREF="https://example.com/?a=1&amp;b=2">Q&amp;A</A>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        assert_eq!(tree.folders[0].title, "R&D <lab>");
        assert_eq!(tree.folders[0].bookmarks[0].url, "https://example.com/?a=1&b=2");
        assert_eq!(tree.folders[0].bookmarks[0].title, "Q&A");
    }

    #[rstest]
    #[case("  padded  ")]
    #[case("line1\nline2")]
    #[case("crlf\r\nend")]
    #[case("literal &#10; entity")]
    #[case("\ttabbed")]
    fn test_titles_survive_round_trip(#[case] title: &str) {
        let mut folder = FolderNode::new(2, title.to_string(), 0, 0, 0);
        folder.bookmarks.push(BookmarkEntry::new(
            3,
            "https://example.com".to_string(),
            title.to_string(),
            0,
            0,
            0,
        ));
        let html = render_html(&BookmarkTree::new(vec![folder]), TimestampFormat::Raw);

        let tree = parse_netscape(&html).unwrap();
        assert_eq!(tree.folders[0].title, title);
        assert_eq!(tree.folders[0].bookmarks[0].title, title);
    }

    #[test]
    fn test_header_without_list_is_empty_folder() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>Lonely</H3>
    <DT><H3>Work</H3>
    <DL><p>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        let titles: Vec<&str> = tree.folders.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Lonely", "Work"]);
        assert!(tree.folders.iter().all(FolderNode::is_empty));
        assert_eq!(tree.folders[1].position, 1);
    }

    #[test]
    fn test_top_level_links_skipped() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><A HREF="https://loose.example">Loose</A>
    <DT><H3>Work</H3>
    <DL><p>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        assert_eq!(tree.folders.len(), 1);
        assert_eq!(tree.bookmark_count(), 0);
    }

    #[test]
    fn test_identifiers_are_unique() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>A</H3>
    <DL><p>
        <DT><A HREF="https://a.example">A1</A>
    </DL><p>
    <DT><H3>B</H3>
    <DL><p>
        <DT><A HREF="https://b.example">B1</A>
    </DL><p>
</DL><p>"#;

        let tree = parse_netscape(html).unwrap();
        let mut ids = vec![tree.folders[0].id, tree.folders[1].id];
        ids.push(tree.folders[0].bookmarks[0].id);
        ids.push(tree.folders[1].bookmarks[0].id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| *id >= FIRST_ID));
    }

    #[rstest]
    #[case("<DL><p>\n</DL><p>", "doctype")]
    #[case("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n<DT><H3>Open</H3>\n<DL><p>\n", "left open")]
    #[case("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n</DL><p>\n</DL><p>", "unbalanced")]
    #[case("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n<DL><p>\n", "without folder header")]
    fn test_malformed_documents(#[case] html: &str, #[case] message: &str) {
        match parse_netscape(html) {
            Err(PlacesyncError::HtmlParse(msg)) => assert!(msg.contains(message), "{}", msg),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_html_file_source() {
        let file = create_temp_html(
            r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>Work</H3>
    <DL><p>
        <DT><A HREF="https://example.com">Example</A>
    </DL><p>
</DL><p>"#,
        );

        let tree = HtmlFileSource::new(file.path()).load().unwrap();
        assert_eq!(tree.bookmark_count(), 1);
    }

    #[test]
    fn test_html_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = HtmlFileSource::new(dir.path().join("absent.html"));
        assert!(matches!(
            source.load(),
            Err(PlacesyncError::SourceUnavailable { .. })
        ));
    }
}
