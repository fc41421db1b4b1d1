//! File attachments for multipart requests.
//!
//! # Design
//! Attachments form an ordered tree: each name maps either to a file or to a
//! nested group of names. `FileTree::flatten` walks the tree depth-first and
//! produces one multipart field per file, with nested names joined as
//! `outer[inner][leaf]`. Insertion order is preserved at every level.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::{FileRef, MultipartField};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Where the bytes of an attachment live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A regular file on disk.
    Path(PathBuf),
    /// The temporary file of an upload this service received itself.
    Upload(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub source: FileSource,
    pub mime_type: String,
    pub file_name: String,
}

impl FileDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            source: FileSource::Path(path.into()),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn uploaded(
        tmp_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            source: FileSource::Upload(tmp_path.into()),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        match &self.source {
            FileSource::Path(path) | FileSource::Upload(path) => path,
        }
    }

    fn to_file_ref(&self) -> FileRef {
        FileRef {
            path: self.path().to_path_buf(),
            mime_type: self.mime_type.clone(),
            file_name: self.file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    File(FileDescriptor),
    Group(FileTree),
}

/// Ordered mapping of field name to file or nested group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: Vec<(String, FileNode)>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, node: FileNode) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((name, node)),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, file: FileDescriptor) -> Self {
        self.insert(name, FileNode::File(file));
        self
    }

    pub fn with_group(mut self, name: impl Into<String>, group: FileTree) -> Self {
        self.insert(name, FileNode::Group(group));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// One multipart field per file, depth-first, in insertion order.
    pub fn flatten(&self) -> Vec<MultipartField> {
        let mut fields = Vec::new();
        self.flatten_into(&mut fields, "", false);
        fields
    }

    fn flatten_into(&self, fields: &mut Vec<MultipartField>, prefix: &str, nested: bool) {
        for (name, node) in &self.entries {
            let key = if nested {
                format!("{prefix}[{name}]")
            } else {
                format!("{prefix}{name}")
            };
            match node {
                FileNode::File(file) => fields.push(MultipartField::file(key, file.to_file_ref())),
                FileNode::Group(group) => group.flatten_into(fields, &key, true),
            }
        }
    }

    /// Build a tree from loosely-typed JSON.
    ///
    /// An object with a non-empty `path` is a file (`mimeType`, `name`); one
    /// with a non-empty `tmp_name` is an upload (`type`, `name`); any other
    /// object is a nested group.
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(entries) => Self::from_map(entries),
            other => Err(ApiError::Encoding(format!(
                "file tree must be an object, got {other}"
            ))),
        }
    }

    fn from_map(entries: &Map<String, Value>) -> Result<Self, ApiError> {
        let mut tree = FileTree::new();
        for (name, value) in entries {
            let Value::Object(entry) = value else {
                return Err(ApiError::Encoding(format!(
                    "file entry `{name}` must be an object"
                )));
            };
            let node = if let Some(path) = non_empty(entry, "path") {
                FileNode::File(FileDescriptor::new(
                    path,
                    non_empty(entry, "mimeType").unwrap_or(DEFAULT_MIME_TYPE),
                    file_name(entry, path),
                ))
            } else if let Some(tmp_path) = non_empty(entry, "tmp_name") {
                FileNode::File(FileDescriptor::uploaded(
                    tmp_path,
                    non_empty(entry, "type").unwrap_or(DEFAULT_MIME_TYPE),
                    file_name(entry, tmp_path),
                ))
            } else {
                FileNode::Group(Self::from_map(entry)?)
            };
            tree.insert(name.clone(), node);
        }
        Ok(tree)
    }
}

fn non_empty<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn file_name(entry: &Map<String, Value>, path: &str) -> String {
    match non_empty(entry, "name") {
        Some(name) => name.to_string(),
        None => Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
