use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ide::navigation::{IdeLocation, IdeRange};
use crate::text_pos::position_from_byte_offset;
use crate::vfs::path_to_uri;

/// Half-open byte range inside one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub const fn new(
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            start,
            end,
        }
    }

    pub const fn empty(at: u32) -> Self {
        Self::new(at, at)
    }

    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both ends, so an offset just past a token still touches it.
    pub const fn touches(
        &self,
        offset: u32,
    ) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub const fn contains_range(
        &self,
        other: TextRange,
    ) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn as_usize(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFileId(pub u32);

impl SourceFileId {
    /// The file the snapshot was built for.
    pub const MAIN: SourceFileId = SourceFileId(0);
}

/// A range tagged with the file it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRange {
    pub file: SourceFileId,
    pub range: TextRange,
}

impl FileRange {
    pub const fn new(
        file: SourceFileId,
        range: TextRange,
    ) -> Self {
        Self {
            file,
            range,
        }
    }

    pub const fn main(range: TextRange) -> Self {
        Self::new(SourceFileId::MAIN, range)
    }

    pub fn is_main(&self) -> bool {
        self.file == SourceFileId::MAIN
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Option<Arc<str>>,
}

/// Files known to one snapshot. Files without text cannot produce locations.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new(
        main_path: PathBuf,
        main_text: Arc<str>,
    ) -> Self {
        Self {
            files: vec![SourceFile {
                path: main_path,
                text: Some(main_text),
            }],
        }
    }

    pub fn add(
        &mut self,
        path: PathBuf,
        text: Option<Arc<str>>,
    ) -> SourceFileId {
        if let Some(existing) = self.find(&path) {
            if text.is_some() && self.files[existing.0 as usize].text.is_none() {
                self.files[existing.0 as usize].text = text;
            }
            return existing;
        }
        self.files.push(SourceFile {
            path,
            text,
        });
        SourceFileId((self.files.len() - 1) as u32)
    }

    pub fn find(
        &self,
        path: &Path,
    ) -> Option<SourceFileId> {
        self.files.iter().position(|file| file.path == path).map(|idx| SourceFileId(idx as u32))
    }

    pub fn file(
        &self,
        id: SourceFileId,
    ) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn path(
        &self,
        id: SourceFileId,
    ) -> Option<&Path> {
        self.file(id).map(|file| file.path.as_path())
    }

    pub fn text(
        &self,
        id: SourceFileId,
    ) -> Option<&str> {
        self.file(id).and_then(|file| file.text.as_deref())
    }

    pub fn main_path(&self) -> &Path {
        self.files.first().map(|file| file.path.as_path()).unwrap_or_else(|| Path::new(""))
    }

    pub fn main_text(&self) -> &str {
        self.text(SourceFileId::MAIN).unwrap_or("")
    }

    pub fn uri(
        &self,
        id: SourceFileId,
    ) -> Option<String> {
        self.path(id).and_then(path_to_uri)
    }

    /// Converts a file range into a user-facing location, or `None` when the file has no text.
    pub fn location(
        &self,
        range: &FileRange,
    ) -> Option<IdeLocation> {
        let file = self.file(range.file)?;
        let text = file.text.as_deref()?;
        if range.range.end as usize > text.len() {
            return None;
        }
        let start = position_from_byte_offset(text, range.range.start as usize);
        let end = position_from_byte_offset(text, range.range.end as usize);
        Some(IdeLocation::new(file.path.clone(), IdeRange::new(start, end)))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
