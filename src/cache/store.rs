//! File-backed TTL cache store and cache-key construction
//!
//! Stores each entry as a JSON file wrapping the serialized value with
//! its origin timestamp and expiry horizon. Entries are never mutated in
//! place: a refresh overwrites the whole file via a temp-file rename, so
//! a concurrent reader sees either the old entry or the new one.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

/// Schema tag prefixed to every cache key. Bump this when the shape of a
/// cached payload changes; old entries then simply expire unread instead
/// of deserializing into the wrong shape.
const SCHEMA_VERSION: &str = "v1";

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// A deterministic cache key built from a query kind and its normalized
/// parameters.
///
/// Parameter values are trimmed and lower-cased, and parameters are
/// sorted by name before rendering, so equivalent queries produce the
/// same key regardless of argument order or casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    kind: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    /// Creates a key for the given query kind (e.g. "movie", "genre")
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.trim().to_lowercase(),
            params: Vec::new(),
        }
    }

    /// Adds a normalized parameter to the key
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params
            .push((name.trim().to_lowercase(), value.trim().to_lowercase()));
        self
    }

    /// Renders the key as `v1:<kind>:<name>=<value>:...` with parameters
    /// sorted by name
    pub fn render(&self) -> String {
        let mut params = self.params.clone();
        params.sort();
        let mut rendered = format!("{SCHEMA_VERSION}:{}", self.kind);
        for (name, value) in params {
            rendered.push_str(&format!(":{name}={value}"));
        }
        rendered
    }

    /// Renders the key as a filesystem-safe file name
    ///
    /// Sanitization is lossy (`q=spider man` and `q=spider-man` flatten
    /// to the same text), so a hash of the full rendered key is appended
    /// to keep distinct keys from sharing a file.
    fn file_name(&self) -> String {
        let rendered = self.render();
        let mut hasher = DefaultHasher::new();
        rendered.hash(&mut hasher);
        let sanitized: String = rendered
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        format!("{sanitized}.{:016x}.json", hasher.finish())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Manages reading and writing cached query results to disk
///
/// The store keeps entries as JSON files in an XDG-compliant cache
/// directory (`~/.cache/cinecache/` on Linux). Reads of absent, expired,
/// or unreadable entries all report a miss; storage failures are logged
/// and never surfaced to the caller (fail-open).
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g.
    /// no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "cinecache")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given key
    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Reads a fresh entry from the cache
    ///
    /// Returns `None` when the entry is absent, expired, or unreadable.
    /// IO failures other than plain absence are logged at `warn`; the
    /// caller proceeds as on any other miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key = %key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "cache entry undecodable; treating as miss");
                return None;
            }
        };

        if Utc::now() > entry.expires_at {
            debug!(key = %key, "cache entry expired");
            return None;
        }

        debug!(key = %key, "cache hit");
        Some(entry.data)
    }

    /// Writes an entry to the cache with the given TTL in seconds
    ///
    /// The entry is serialized into a temp file and renamed into place,
    /// so a concurrent reader never observes a torn entry. Write
    /// failures are logged and swallowed (fail-open): the derived result
    /// has already been computed and the caller returns it regardless.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) {
        if let Err(e) = self.try_set(key, value, ttl_secs) {
            warn!(key = %key, error = %e, "cache write failed; continuing without cache");
        }
    }

    fn try_set<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl_secs: u64,
    ) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data: value,
            cached_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let path = self.entry_path(key);
        let tmp_path = path.with_extension(format!(
            "tmp.{}.{}",
            std::process::id(),
            now.timestamp_nanos_opt().unwrap_or_default()
        ));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)
    }

    /// Removes the entry for the given key, if present
    ///
    /// Removal failures are logged and swallowed; the entry will be
    /// overwritten on the next refresh anyway.
    pub fn invalidate(&self, key: &CacheKey) {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => debug!(key = %key, "cache entry invalidated"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(key = %key, error = %e, "cache invalidation failed"),
        }
    }
}
