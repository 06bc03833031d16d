use std::collections::BTreeMap;

use mime::Mime;
use serde_json::Value;

use super::OpenMode;

/// Metadata describing a stream and its capabilities.
///
/// Besides the well known fields, `extra` carries arbitrary JSON entries. The client
/// reads per-request transfer options from it and tags response bodies with the
/// transfer info.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamMetadata {
    /// Path or identifier of the underlying resource
    pub uri: Option<String>,
    /// The mode the resource was opened with
    pub mode: Option<String>,
    /// Cached size in bytes
    pub size: Option<u64>,
    pub seekable: bool,
    pub readable: bool,
    pub writable: bool,
    pub media_type: Option<Mime>,
    pub extra: BTreeMap<String, Value>,
}

impl StreamMetadata {
    /// Creates metadata whose capability flags follow `mode`.
    pub fn for_mode(mode: OpenMode) -> Self {
        Self {
            mode: Some(mode.to_string()),
            readable: mode.is_readable(),
            writable: mode.is_writable(),
            ..Default::default()
        }
    }

    /// Returns the extra entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Stores an extra entry, replacing any previous value under `key`.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) -> Option<Value> {
        self.extra.insert(key.into(), value)
    }

    /// Builder style variant of [`StreamMetadata::insert`].
    #[must_use]
    pub fn with_entry<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Fills every field that is unset here from `defaults`.
    ///
    /// Flags are or-ed, extra entries already present win.
    #[must_use]
    pub fn merge(mut self, defaults: StreamMetadata) -> Self {
        self.uri = self.uri.or(defaults.uri);
        self.mode = self.mode.or(defaults.mode);
        self.size = self.size.or(defaults.size);
        self.media_type = self.media_type.or(defaults.media_type);
        self.seekable |= defaults.seekable;
        self.readable |= defaults.readable;
        self.writable |= defaults.writable;
        for (key, value) in defaults.extra {
            self.extra.entry(key).or_insert(value);
        }
        self
    }
}
