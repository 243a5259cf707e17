//! Local fixture data answering API queries without a network.
//!
//! Reads `mockdata.json` (items) and `items.json` (name catalog) from a
//! directory, transparently handling `.gz` copies of either. Queries are
//! answered in memory with the same filter, sort and page parameters the
//! remote API accepts.

use std::cmp::Ordering;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use crate::config;
use crate::error::{RomExchangeError, Result};
use crate::models::{Direction, Item, NameEntry, QueryOptions, Range, Server, Sort};

/// In-memory item table loaded from fixture files.
pub struct FixtureStore {
    items: Vec<Item>,
    names: Vec<NameEntry>,
    page_size: usize,
}

impl FixtureStore {
    /// Load fixtures from `dir`.
    ///
    /// The item file is required. When the name catalog is missing it is
    /// derived from the items.
    pub fn load(dir: &Path) -> Result<Self> {
        let files = config::fixture_files();
        let items_path = locate(dir, files["items"]).ok_or_else(|| {
            RomExchangeError::NotFound(format!(
                "Fixture file {} not found in {}",
                files["items"],
                dir.display()
            ))
        })?;
        let items: Vec<Item> = load_json(&items_path)?;
        let items: Vec<Item> = items.into_iter().map(Item::normalized).collect();

        let names: Vec<NameEntry> = match locate(dir, files["names"]) {
            Some(path) => load_json(&path)?,
            None => items
                .iter()
                .map(|i| NameEntry {
                    name: i.name.clone(),
                    item_type: i.item_type,
                })
                .collect(),
        };

        tracing::info!(
            items = items.len(),
            names = names.len(),
            dir = %dir.display(),
            "loaded fixtures"
        );
        Ok(Self::from_parts(items, names))
    }

    /// Build a store directly from parsed data.
    pub fn from_parts(items: Vec<Item>, names: Vec<NameEntry>) -> Self {
        Self {
            items,
            names,
            page_size: config::FIXTURE_PAGE_SIZE,
        }
    }

    pub fn names(&self) -> &[NameEntry] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Answer one `/api` query: filter, sort, then slice out `query.page`.
    pub fn query(&self, query: &QueryOptions) -> Vec<Item> {
        let needle = query.item.trim().to_lowercase();
        let mut matches: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| {
                if needle.is_empty() {
                    return true;
                }
                let name = item.name.to_lowercase();
                if query.exact {
                    name == needle
                } else {
                    name.contains(&needle)
                }
            })
            .filter(|item| query.item_type.is_all() || item.item_type == query.item_type)
            .collect();

        let sort = query.sort;
        matches.sort_by(|a, b| {
            let ord = sort_key(a, sort.sort, sort.server, sort.range)
                .partial_cmp(&sort_key(b, sort.sort, sort.server, sort.range))
                .unwrap_or(Ordering::Equal);
            match sort.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });

        let page = query.page.max(1) as usize;
        matches
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }
}

fn sort_key(item: &Item, sort: Sort, server: Server, range: Range) -> f64 {
    match sort {
        Sort::Diff => item.global_sea_diff,
        Sort::Change => match server {
            Server::Both => {
                (item.global.range(range).change + item.sea.range(range).change) / 2.0
            }
            single => item.server(single).range(range).change,
        },
    }
}

/// Find `name` or `name.gz` under `dir`.
fn locate(dir: &Path, name: &str) -> Option<PathBuf> {
    let plain = dir.join(name);
    if plain.exists() {
        return Some(plain);
    }
    let gz = dir.join(format!("{}.gz", name));
    gz.exists().then_some(gz)
}

/// Read and parse a JSON fixture (handles `.gz` transparently).
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let file = fs::File::open(path)?;
        let mut decoder = BufReader::new(GzDecoder::new(BufReader::new(file)));
        let mut contents = String::new();
        decoder.read_to_string(&mut contents)?;
        contents
    } else {
        fs::read_to_string(path)?
    };

    serde_json::from_str(&contents).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "corrupt fixture file");
        RomExchangeError::NotFound(format!(
            "Fixture file '{}' could not be parsed: {}",
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown"),
            e
        ))
    })
}
