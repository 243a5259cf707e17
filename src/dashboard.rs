//! Shareable dashboard links.
//!
//! A dashboard is an ordered list of item names packed into the `q` query
//! parameter as percent-encoded labels joined by an encoded `|`. Links are
//! capped at a maximum length; items that do not fit are dropped from the
//! first overflowing one onward.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::catalog::{identity_key, Catalog};
use crate::config;
use crate::error::{RomExchangeError, Result};
use crate::location;

/// Characters escaped in a query component, matching what browsers leave
/// untouched in `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const SEPARATOR: char = '|';
pub const ENCODED_SEPARATOR: &str = "%7C";

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One selected item: display label plus case-insensitive identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub label: String,
    pub key: String,
}

impl SelectedItem {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let key = identity_key(&label);
        Self { label, key }
    }
}

/// Ordered set of selected items; identity is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSelection {
    items: Vec<SelectedItem>,
}

impl DashboardSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `label` at the end. Returns `false` if an item with the same
    /// identity is already selected or the label is blank.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let item = SelectedItem::new(label);
        if item.key.is_empty() || self.contains(&item.key) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item matching `name` in any casing.
    pub fn remove(&mut self, name: &str) -> Option<SelectedItem> {
        let key = identity_key(name);
        let pos = self.items.iter().position(|i| i.key == key)?;
        Some(self.items.remove(pos))
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = identity_key(name);
        self.items.iter().any(|i| i.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DashboardSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for label in iter {
            selection.insert(label);
        }
        selection
    }
}

impl From<Vec<SelectedItem>> for DashboardSelection {
    fn from(items: Vec<SelectedItem>) -> Self {
        let mut selection = Self::new();
        for item in items {
            selection.insert(item.label);
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// EncodedDashboard
// ---------------------------------------------------------------------------

/// Result of encoding a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDashboard {
    pub url: String,
    /// True when at least one selected item did not fit.
    pub truncated: bool,
    /// Label of the first item left out.
    pub first_dropped: Option<String>,
    /// Number of items that made it into the URL.
    pub included: usize,
}

impl EncodedDashboard {
    /// User-facing warning for a truncated link.
    pub fn warning(&self) -> Option<String> {
        self.first_dropped.as_ref().map(|label| {
            format!(
                "Dashboard link is too long; \"{}\" and every item after it were left out.",
                label
            )
        })
    }
}

// ---------------------------------------------------------------------------
// DashboardCodec
// ---------------------------------------------------------------------------

/// Encodes selections into links and decodes links back into selections.
#[derive(Debug, Clone)]
pub struct DashboardCodec {
    prefix: String,
    max_len: usize,
}

impl Default for DashboardCodec {
    fn default() -> Self {
        Self {
            prefix: format!("{}?q=", config::DEFAULT_BASE_URL),
            max_len: config::MAX_URL_LEN,
        }
    }
}

impl DashboardCodec {
    /// Codec producing `{origin}?q=...` links no longer than `max_len`.
    ///
    /// Fails if the bare prefix is already longer than `max_len`.
    pub fn new(origin: &str, max_len: usize) -> Result<Self> {
        let prefix = format!("{}?q=", origin.trim_end_matches('/'));
        if prefix.len() > max_len {
            return Err(RomExchangeError::InvalidArgument(format!(
                "Dashboard origin '{}' does not fit in {} characters",
                origin, max_len
            )));
        }
        Ok(Self { prefix, max_len })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Pack `items` into a link, in order, stopping at the first item that
    /// would push the link past the maximum length.
    pub fn encode(&self, items: &[SelectedItem]) -> EncodedDashboard {
        let mut url = self.prefix.clone();
        let mut first_dropped = None;
        let mut included = 0;

        for item in items {
            let encoded = utf8_percent_encode(&item.label, COMPONENT).to_string();
            let separator = if included == 0 { "" } else { ENCODED_SEPARATOR };
            if url.len() + separator.len() + encoded.len() > self.max_len {
                first_dropped = Some(item.label.clone());
                break;
            }
            url.push_str(separator);
            url.push_str(&encoded);
            included += 1;
        }

        if let Some(label) = &first_dropped {
            tracing::warn!(
                included,
                dropped = items.len() - included,
                first_dropped = %label,
                "dashboard link truncated"
            );
        }

        EncodedDashboard {
            url,
            truncated: first_dropped.is_some(),
            first_dropped,
            included,
        }
    }

    /// Encode a [`DashboardSelection`].
    pub fn encode_selection(&self, selection: &DashboardSelection) -> EncodedDashboard {
        self.encode(selection.as_slice())
    }

    /// Unpack a raw `q` value into catalog-validated items.
    ///
    /// Unknown names, blank segments and segments with broken escapes are
    /// skipped. Labels come back in their catalog spelling.
    pub fn decode(&self, raw: &str, catalog: &Catalog) -> Vec<SelectedItem> {
        let mut selection = DashboardSelection::new();
        for segment in split_segments(raw) {
            if segment.trim().is_empty() {
                continue;
            }
            let Some(name) = decode_segment(segment) else {
                tracing::debug!(segment, "skipping malformed dashboard segment");
                continue;
            };
            match catalog.resolve(&name) {
                Some(entry) => {
                    selection.insert(entry.name.clone());
                }
                None => tracing::debug!(name = %name, "skipping unknown dashboard item"),
            }
        }
        selection.items
    }

    /// Decode the `q` parameter of a full dashboard URL.
    pub fn decode_url(&self, url: &str, catalog: &Catalog) -> Vec<SelectedItem> {
        location::raw_query_value(url, "q")
            .map(|raw| self.decode(raw, catalog))
            .unwrap_or_default()
    }
}

/// Split on a literal `|` or an encoded `%7C` in either case.
fn split_segments(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == SEPARATOR as u8 {
            segments.push(&raw[start..i]);
            i += 1;
            start = i;
        } else if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1] == b'7'
            && bytes[i + 2].eq_ignore_ascii_case(&b'c')
        {
            segments.push(&raw[start..i]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    segments.push(&raw[start..]);
    segments
}

/// Percent-decode one segment; `None` on a dangling `%` or invalid UTF-8.
fn decode_segment(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return None;
            }
        }
    }
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
