use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::query::{ItemType, Range, Server};

// ---------------------------------------------------------------------------
// DataPoint - Single price observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub time: DateTime<Utc>,
    pub price: i64,
    /// True when the price comes from an open snapshot rather than a settled daily price.
    #[serde(default)]
    pub snap: bool,
}

impl DataPoint {
    /// The UTC calendar day this observation belongs to.
    pub fn day(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

// ---------------------------------------------------------------------------
// RangeSeries - Price history over one time window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub data: Vec<DataPoint>,
    #[serde(default)]
    pub change: f64,
}

impl RangeSeries {
    /// Sort ascending by time and keep one point per UTC day.
    ///
    /// When several observations share a day, the latest one wins.
    pub fn normalize(&mut self) {
        self.data.sort_by_key(|p| p.time);
        let mut out: Vec<DataPoint> = Vec::with_capacity(self.data.len());
        for point in self.data.drain(..) {
            match out.last_mut() {
                Some(last) if last.day() == point.day() => *last = point,
                _ => out.push(point),
            }
        }
        self.data = out;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ServerSeries - Latest price plus the three range windows for one region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSeries {
    #[serde(default)]
    pub latest: i64,
    #[serde(default)]
    pub all: RangeSeries,
    #[serde(default)]
    pub month: RangeSeries,
    #[serde(default)]
    pub week: RangeSeries,
}

impl ServerSeries {
    pub fn range(&self, range: Range) -> &RangeSeries {
        match range {
            Range::All => &self.all,
            Range::Month => &self.month,
            Range::Week => &self.week,
        }
    }

    pub fn normalize(&mut self) {
        self.all.normalize();
        self.month.normalize();
        self.week.normalize();
    }
}

// ---------------------------------------------------------------------------
// Item - One tradeable item with history on both servers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub global_sea_diff: f64,
    #[serde(default)]
    pub global: ServerSeries,
    #[serde(default)]
    pub sea: ServerSeries,
}

impl Item {
    /// Series for a single region. `Server::Both` has no single series and
    /// resolves to the global one.
    pub fn server(&self, server: Server) -> &ServerSeries {
        match server {
            Server::Sea => &self.sea,
            Server::Global | Server::Both => &self.global,
        }
    }

    /// Normalize every range series on both servers.
    pub fn normalize(&mut self) {
        self.global.normalize();
        self.sea.normalize();
    }

    /// Return a normalized copy.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

// ---------------------------------------------------------------------------
// NameEntry - Catalog record from the item name endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
}
