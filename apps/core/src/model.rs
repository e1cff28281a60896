use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ROOT_FOLDER: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    pub basename: String,
    pub extension: String,
    pub parent: String,
}

impl FileRef {
    pub fn new(path: &str) -> Self {
        let path = normalize_vault_path(path);
        let (parent, name) = match path.rfind('/') {
            Some(index) => (path[..index].to_string(), &path[index + 1..]),
            None => (ROOT_FOLDER.to_string(), path.as_str()),
        };
        let (basename, extension) = match name.rfind('.') {
            Some(index) if index > 0 => (name[..index].to_string(), name[index + 1..].to_string()),
            _ => (name.to_string(), String::new()),
        };

        Self {
            basename,
            extension,
            parent,
            path,
        }
    }

    pub fn name(&self) -> String {
        if self.extension.is_empty() {
            self.basename.clone()
        } else {
            format!("{}.{}", self.basename, self.extension)
        }
    }

    pub fn parent_path(&self) -> &str {
        &self.parent
    }

    pub fn is_markdown(&self) -> bool {
        self.extension.eq_ignore_ascii_case("md")
    }
}

pub fn normalize_vault_path(input: &str) -> String {
    input
        .replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn line(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start: Position::new(line, start_col),
            end: Position::new(line, end_col),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCache {
    pub heading: String,
    pub level: u8,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCache {
    pub tag: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCache {
    pub link: String,
    pub original: String,
    pub display_text: Option<String>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCache {
    pub kind: String,
    pub position: Span,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCache {
    pub headings: Vec<HeadingCache>,
    pub tags: Vec<TagCache>,
    pub links: Vec<LinkCache>,
    pub embeds: Vec<LinkCache>,
    pub sections: Vec<SectionCache>,
    pub frontmatter: Option<FrontMatter>,
}

impl FileCache {
    pub fn aliases(&self) -> &[String] {
        self.frontmatter
            .as_ref()
            .map(|fm| fm.aliases.as_slice())
            .unwrap_or_default()
    }
}

/// `source path -> destination -> link count`.
pub type LinkIndex = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeafId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub id: LeafId,
    pub view_type: String,
    pub file: Option<FileRef>,
    pub display_text: String,
    pub is_main_area: bool,
    pub cursor: Option<Position>,
    pub last_active_time: u64,
}

impl Leaf {
    pub fn markdown(id: u64, file: FileRef) -> Self {
        Self {
            id: LeafId(id),
            view_type: "markdown".to_string(),
            display_text: file.basename.clone(),
            file: Some(file),
            is_main_area: true,
            cursor: None,
            last_active_time: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEntry {
    File(FileRef),
    Folder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookmarkItem {
    File {
        path: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        subpath: Option<String>,
    },
    Folder {
        path: String,
        #[serde(default)]
        title: Option<String>,
    },
    Search {
        query: String,
        #[serde(default)]
        title: Option<String>,
    },
    Url {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    Group {
        title: String,
        #[serde(default)]
        items: Vec<BookmarkItem>,
    },
}

impl BookmarkItem {
    pub fn display_title(&self) -> String {
        match self {
            Self::File { path, title, subpath } => title.clone().unwrap_or_else(|| {
                let file = FileRef::new(path);
                match subpath {
                    Some(subpath) => format!("{}{}", file.basename, subpath),
                    None => file.basename,
                }
            }),
            Self::Folder { path, title } => title.clone().unwrap_or_else(|| path.clone()),
            Self::Search { query, title } => title.clone().unwrap_or_else(|| query.clone()),
            Self::Url { url, title } => title.clone().unwrap_or_else(|| url.clone()),
            Self::Group { title, .. } => title.clone(),
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    pub id: String,
    pub name: String,
    pub path: String,
    pub is_open: bool,
}
