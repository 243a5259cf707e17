//! Shared test fixtures for the ROM Exchange SDK integration tests.
//!
//! Provides sample items (as JSON and as typed values), helpers that write
//! them into a temporary fixture directory, and small in-process
//! [`PriceSource`] implementations for driving the feed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use rom_exchange_sdk::models::{Item, ItemType, NameEntry, QueryOptions, RangeSeries, ServerSeries};
use rom_exchange_sdk::{Catalog, PriceSource, RomExchangeError, RomExchangeSdk};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Typed items
// ---------------------------------------------------------------------------

/// A bare item with empty history.
pub fn item(name: &str) -> Item {
    Item {
        name: name.to_string(),
        item_type: ItemType(8),
        image: None,
        global_sea_diff: 0.0,
        global: ServerSeries::default(),
        sea: ServerSeries::default(),
    }
}

/// `count` bare items named `{prefix} 1` .. `{prefix} count`.
pub fn page(prefix: &str, count: usize) -> Vec<Item> {
    (1..=count).map(|i| item(&format!("{} {}", prefix, i))).collect()
}

pub fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

pub fn catalog(names: &[&str]) -> Catalog {
    Catalog::new(
        names
            .iter()
            .map(|n| NameEntry {
                name: n.to_string(),
                item_type: ItemType(8),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// JSON fixtures
// ---------------------------------------------------------------------------

fn range(points: &[(&str, i64, bool)], change: f64) -> Value {
    json!({
        "data": points
            .iter()
            .map(|(time, price, snap)| json!({"time": time, "price": price, "snap": snap}))
            .collect::<Vec<_>>(),
        "change": change,
    })
}

fn server(latest: i64, week: Value) -> Value {
    json!({
        "latest": latest,
        "all": range(&[("2019-01-01T00:00:00.000Z", latest, false)], 0.0),
        "month": range(&[("2019-02-01T00:00:00.000Z", latest, false)], 0.0),
        "week": week,
    })
}

fn simple_item(name: &str, item_type: u32, global_change: f64, sea_change: f64, diff: f64) -> Value {
    json!({
        "name": name,
        "type": item_type,
        "image": format!("https://www.romexchange.com/img/{}.png", name.replace(' ', "_")),
        "global_sea_diff": diff,
        "global": server(1000, range(&[("2019-02-20T00:00:00.000Z", 1000, false)], global_change)),
        "sea": server(1200, range(&[("2019-02-20T00:00:00.000Z", 1200, false)], sea_change)),
    })
}

/// Sample items. "Red Potion" has an unsorted week series with two
/// observations on 2019-02-21.
pub fn sample_items_json() -> Vec<Value> {
    let red_potion = json!({
        "name": "Red Potion",
        "type": 8,
        "image": "https://www.romexchange.com/img/Red_Potion.png",
        "global_sea_diff": -12.5,
        "global": server(45, range(&[
            ("2019-02-22T00:00:00.000Z", 47, false),
            ("2019-02-20T00:00:00.000Z", 40, false),
            ("2019-02-21T00:00:00.000Z", 42, false),
            ("2019-02-21T18:30:00.000Z", 44, true),
        ], 12.5)),
        "sea": server(52, range(&[
            ("2019-02-19T00:00:00.000Z", 50, false),
            ("2019-02-21T00:00:00.000Z", 52, false),
        ], 4.0)),
    });

    vec![
        red_potion,
        simple_item("Blue Potion", 8, 30.0, 10.0, 5.0),
        simple_item("Yellow Potion", 8, -5.0, -1.0, 1.0),
        simple_item("Elunium", 11, 2.0, 2.0, -40.0),
        simple_item("Oridecon", 11, 8.0, 0.0, 20.0),
        simple_item("Knife*", 1, 0.0, 0.0, 0.0),
    ]
}

pub fn sample_names_json() -> Value {
    json!([
        {"name": "Red Potion", "type": 8},
        {"name": "Blue Potion", "type": 8},
        {"name": "Yellow Potion", "type": 8},
        {"name": "Elunium", "type": 11},
        {"name": "Oridecon", "type": 11},
        {"name": "Knife*", "type": 1},
    ])
}

/// Write `mockdata.json` and `items.json` into `dir`, gzipped if asked.
pub fn write_fixtures(dir: &Path, items: &[Value], names: Option<&Value>, gzip: bool) {
    write_json(dir, "mockdata.json", &Value::Array(items.to_vec()), gzip);
    if let Some(names) = names {
        write_json(dir, "items.json", names, gzip);
    }
}

fn write_json(dir: &Path, name: &str, value: &Value, gzip: bool) {
    let body = serde_json::to_vec(value).unwrap();
    if gzip {
        let file = fs::File::create(dir.join(format!("{}.gz", name))).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&body).unwrap();
        encoder.finish().unwrap();
    } else {
        fs::write(dir.join(name), body).unwrap();
    }
}

/// SDK answering from a temporary fixture directory with the sample data.
///
/// Returns `(RomExchangeSdk, tempfile::TempDir)`. Keep the `TempDir` alive
/// for the duration of the test.
pub fn setup_fixture_sdk() -> (RomExchangeSdk, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    write_fixtures(tmp_dir.path(), &sample_items_json(), Some(&sample_names_json()), false);
    let sdk = RomExchangeSdk::builder()
        .fixtures(tmp_dir.path())
        .origin("https://www.romexchange.com")
        .build()
        .unwrap();
    (sdk, tmp_dir)
}

// ---------------------------------------------------------------------------
// In-process sources
// ---------------------------------------------------------------------------

/// Serves `pages[n - 1]` for page `n` (empty past the end) and records every
/// query it sees.
pub struct PagedSource {
    pub pages: Vec<Vec<Item>>,
    pub names: Vec<NameEntry>,
    pub seen: RefCell<Vec<QueryOptions>>,
    pub name_fetches: RefCell<usize>,
}

impl PagedSource {
    pub fn new(pages: Vec<Vec<Item>>) -> Self {
        Self {
            pages,
            names: Vec::new(),
            seen: RefCell::new(Vec::new()),
            name_fetches: RefCell::new(0),
        }
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names
            .iter()
            .map(|n| NameEntry {
                name: n.to_string(),
                item_type: ItemType(8),
            })
            .collect();
        self
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.seen.borrow().iter().map(|q| q.page).collect()
    }
}

impl PriceSource for PagedSource {
    fn fetch_items(&self, query: &QueryOptions) -> rom_exchange_sdk::Result<Vec<Item>> {
        self.seen.borrow_mut().push(query.clone());
        Ok(self
            .pages
            .get(query.page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_names(&self) -> rom_exchange_sdk::Result<Vec<NameEntry>> {
        *self.name_fetches.borrow_mut() += 1;
        Ok(self.names.clone())
    }
}

/// Every request fails.
pub struct FailingSource;

impl PriceSource for FailingSource {
    fn fetch_items(&self, _query: &QueryOptions) -> rom_exchange_sdk::Result<Vec<Item>> {
        Err(RomExchangeError::NotFound("connection refused".into()))
    }

    fn fetch_names(&self) -> rom_exchange_sdk::Result<Vec<NameEntry>> {
        Err(RomExchangeError::NotFound("connection refused".into()))
    }
}

/// Range series from typed points.
pub fn series(points: Vec<rom_exchange_sdk::models::DataPoint>, change: f64) -> RangeSeries {
    RangeSeries { data: points, change }
}
