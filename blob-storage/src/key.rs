use std::fmt;
use std::path::{Component, Path};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::errors::{BlobResult, BlobStoreError};

/// Longest sanitized name kept at the end of a key. Leaves room for the id,
/// the timestamp and the partial-file affixes inside a 255 byte filename.
pub const MAX_NAME_LEN: usize = 128;

const MAX_EXTENSION_LEN: usize = 16;
const FALLBACK_NAME: &str = "file";
const UUID_LEN: usize = 36;
const MAX_KEY_LEN: usize = UUID_LEN + 1 + 20 + 1 + MAX_NAME_LEN;

/// Identifier of one stored blob: `<uuid>-<epoch millis>-<sanitized name>`.
///
/// A `StorageKey` only exists after passing [`StorageKey::parse`] or being
/// produced by [`StorageKey::generate`], so it is always a single, plain path
/// component that is safe to join onto the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    key: String,
    id: Uuid,
    created_at: DateTime<Utc>,
    name_offset: usize,
}

impl StorageKey {
    /// Builds a fresh key for an upload. The 128-bit random id makes two calls
    /// with the same name collide with negligible probability.
    pub fn generate(original_name: &str) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let created_at = DateTime::from_timestamp_millis(millis).unwrap_or(now);
        let name = sanitize_filename(original_name);
        let key = format!("{id}-{millis}-{name}");
        let name_offset = key.len() - name.len();
        Self { key, id, created_at, name_offset }
    }

    /// Validates an untrusted key, e.g. one taken from a download URL.
    pub fn parse(raw: &str) -> BlobResult<Self> {
        let invalid = || BlobStoreError::InvalidKey(raw.to_string());

        if raw.is_empty()
            || raw.len() > MAX_KEY_LEN
            || raw.starts_with('.')
            || !raw.chars().all(is_name_char)
        {
            return Err(invalid());
        }

        let mut components = Path::new(raw).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(invalid());
        }

        // charset check above guarantees ASCII, so byte offsets are char boundaries
        if raw.len() <= UUID_LEN {
            return Err(invalid());
        }
        let (id_part, rest) = raw.split_at(UUID_LEN);
        let id = Uuid::parse_str(id_part).map_err(|_| invalid())?;

        let rest = rest.strip_prefix('-').ok_or_else(invalid)?;
        let (millis, name) = rest.split_once('-').ok_or_else(invalid)?;
        if millis.is_empty()
            || !millis.bytes().all(|b| b.is_ascii_digit())
            || name.is_empty()
            || name.starts_with('.')
        {
            return Err(invalid());
        }
        let created_at = millis
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(invalid)?;

        Ok(Self {
            key: raw.to_string(),
            id,
            created_at,
            name_offset: raw.len() - name.len(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The sanitized original filename embedded in the key.
    pub fn name(&self) -> &str {
        &self.key[self.name_offset..]
    }

    /// Hidden sibling the blob is streamed into before it becomes visible.
    pub(crate) fn partial_name(&self) -> String {
        format!(".{}.part", self.key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

/// Reduces a client supplied filename to something safe to embed in a key.
///
/// Only the last path segment survives, every character outside
/// `[A-Za-z0-9._-]` becomes `_` and leading dots are dropped.
pub fn sanitize_filename(original_name: &str) -> String {
    let base = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    let replaced: String = base
        .chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect();
    let name = truncate_name(replaced.trim_start_matches('.'));
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

// Input is ASCII at this point.
fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_LEN => {
            let stem_len = (MAX_NAME_LEN - ext.len() - 1).min(stem.len());
            format!("{}.{}", &stem[..stem_len], ext)
        }
        _ => name[..MAX_NAME_LEN].to_string(),
    }
}
