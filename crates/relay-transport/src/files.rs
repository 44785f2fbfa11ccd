//! # File Descriptors
//!
//! Files never travel inside the envelope. A [`File`] only describes where
//! the content can be fetched: a `file://` path for files local to the
//! service host, or an `http://` URL served by the originating component.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relay_core::ActionKey;

/// A file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct File {
    /// File parameter name.
    pub name: String,
    /// `file://` path or `http://` URL of the content. Empty for the
    /// placeholder handed out when a file was not sent.
    #[serde(default)]
    pub path: String,
    /// MIME type.
    #[serde(default)]
    pub mime: String,
    /// Original file name.
    #[serde(default)]
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Access token for remote files.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl File {
    /// Describe a file by name, path and MIME type.
    pub fn new(name: impl Into<String>, path: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            mime: mime.into(),
            ..Self::default()
        }
    }

    /// The placeholder for a file that was not sent.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the original file name and size.
    pub fn with_details(mut self, filename: impl Into<String>, size: u64) -> Self {
        self.filename = filename.into();
        self.size = size;
        self
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Whether the descriptor points at content.
    pub fn exists(&self) -> bool {
        !self.path.is_empty()
    }

    /// Whether the content is on the local filesystem.
    pub fn is_local(&self) -> bool {
        self.path.starts_with("file://")
    }
}

type Names = BTreeMap<String, File>;
type Actions = BTreeMap<String, Names>;
type Versions = BTreeMap<String, Actions>;

/// File descriptors grouped service -> version -> action -> name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportFiles {
    services: BTreeMap<String, Versions>,
}

impl TransportFiles {
    /// Register a file for the action `key`.
    pub fn add(&mut self, key: &ActionKey, file: File) {
        self.services
            .entry(key.service.clone())
            .or_default()
            .entry(key.version.clone())
            .or_default()
            .entry(key.action.clone())
            .or_default()
            .insert(file.name.clone(), file);
    }

    /// Whether the action `key` has a file called `name`.
    pub fn has(&self, key: &ActionKey, name: &str) -> bool {
        self.get(key, name).is_some()
    }

    /// The file `name` of the action `key`, or `None`.
    pub fn get(&self, key: &ActionKey, name: &str) -> Option<&File> {
        self.services
            .get(&key.service)
            .and_then(|versions| versions.get(&key.version))
            .and_then(|actions| actions.get(&key.action))
            .and_then(|names| names.get(name))
    }

    /// Files of the action `key`, ordered by name.
    pub fn for_action(&self, key: &ActionKey) -> Vec<&File> {
        self.services
            .get(&key.service)
            .and_then(|versions| versions.get(&key.version))
            .and_then(|actions| actions.get(&key.action))
            .map(|names| names.values().collect())
            .unwrap_or_default()
    }

    /// Every file of every action, flattened.
    pub fn all(&self) -> impl Iterator<Item = &File> {
        self.services
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
    }

    /// Whether no file is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_scoped_to_action() {
        let mut files = TransportFiles::default();
        let read = ActionKey::new("users", "1.0.0", "read");
        let list = ActionKey::new("users", "1.0.0", "list");
        files.add(&read, File::new("avatar", "file:///tmp/a.png", "image/png"));

        assert!(files.has(&read, "avatar"));
        assert!(!files.has(&list, "avatar"));
        assert_eq!(files.get(&list, "avatar"), None);
        assert_eq!(files.for_action(&read).len(), 1);
    }

    #[test]
    fn all_flattens_groups() {
        let mut files = TransportFiles::default();
        files.add(&ActionKey::new("a", "1", "x"), File::new("f1", "file:///1", "text/plain"));
        files.add(&ActionKey::new("b", "2", "y"), File::new("f2", "http://h/2", "text/plain"));
        let names: Vec<&str> = files.all().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f1", "f2"]);
    }

    #[test]
    fn descriptor_flags() {
        assert!(!File::empty("x").exists());
        let local = File::new("x", "file:///tmp/x", "text/plain");
        assert!(local.exists() && local.is_local());
        let remote = File::new("x", "http://127.0.0.1:8080/x", "text/plain").with_token("t");
        assert!(remote.exists() && !remote.is_local());
    }
}
