//! Chart-ready series for an item's price history.
//!
//! Builds one shared day axis from the servers on display and pads each
//! server's points onto it, so a line chart can draw both regions against
//! the same labels. Rendering itself is left to the caller.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thousands::Separable;

use crate::models::{DataPoint, Item, Range, Server};

/// One server's line on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub server: Server,
    /// One slot per label; `None` where the server has no observation that day.
    pub points: Vec<Option<DataPoint>>,
}

impl ChartDataset {
    /// Prices per slot, for charting libraries that take plain numbers.
    pub fn prices(&self) -> Vec<Option<i64>> {
        self.points.iter().map(|p| p.as_ref().map(|p| p.price)).collect()
    }

    /// Per-slot snapshot flags; open bets are usually drawn in a distinct color.
    pub fn snaps(&self) -> Vec<bool> {
        self.points
            .iter()
            .map(|p| p.as_ref().is_some_and(|p| p.snap))
            .collect()
    }
}

/// Labels plus one padded dataset per displayed server.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// Build chart data for `item` over `range`, showing `server`.
    ///
    /// `Server::Both` yields the global dataset followed by the SEA one.
    pub fn build(item: &Item, range: Range, server: Server) -> Self {
        let regions = server.regions();

        let labels: Vec<NaiveDate> = regions
            .iter()
            .flat_map(|&r| item.server(r).range(range).data.iter().map(DataPoint::day))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let datasets = regions
            .iter()
            .map(|&r| ChartDataset {
                server: r,
                points: pad_to_labels(&item.server(r).range(range).data, &labels),
            })
            .collect();

        Self { labels, datasets }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Walk `data` (ascending, one point per day) against `labels`.
fn pad_to_labels(data: &[DataPoint], labels: &[NaiveDate]) -> Vec<Option<DataPoint>> {
    let mut cursor = 0;
    labels
        .iter()
        .map(|label| {
            while cursor < data.len() && data[cursor].day() < *label {
                cursor += 1;
            }
            match data.get(cursor) {
                Some(point) if point.day() == *label => {
                    cursor += 1;
                    Some(point.clone())
                }
                _ => None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increase,
    Decrease,
    Flat,
}

/// Latest price and change for one server, as shown above the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSummary {
    pub server: Server,
    pub latest: i64,
    pub change: f64,
    pub trend: Trend,
}

impl ServerSummary {
    /// One summary per displayed server, global first.
    pub fn for_item(item: &Item, range: Range, server: Server) -> Vec<Self> {
        server
            .regions()
            .iter()
            .map(|&r| {
                let series = item.server(r);
                let change = series.range(range).change;
                let trend = if change > 0.0 {
                    Trend::Increase
                } else if change < 0.0 {
                    Trend::Decrease
                } else {
                    Trend::Flat
                };
                Self {
                    server: r,
                    latest: series.latest,
                    change,
                    trend,
                }
            })
            .collect()
    }

    pub fn price_label(&self) -> String {
        format_price(self.latest)
    }

    pub fn change_label(&self) -> String {
        format_change(self.change)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `1234567` -> `"1,234,567 Z"`.
pub fn format_price(price: i64) -> String {
    format!("{} Z", price.separate_with_commas())
}

/// `5.0` -> `"+5%"`, `-3.25` -> `"-3.25%"`, `0.0` -> `"0%"`.
pub fn format_change(change: f64) -> String {
    let sign = if change > 0.0 { "+" } else { "" };
    format!("{}{}%", sign, change)
}

/// Axis tick label: verbatim below 1000, otherwise thousands rounded to two
/// significant digits and then to a whole number, suffixed with `K`.
pub fn format_price_tick(value: f64) -> String {
    if value < 1000.0 {
        return format!("{}", value);
    }
    let in_thousands = value / 1000.0;
    let magnitude = in_thousands.abs().log10().floor() as i32;
    let scale = 10f64.powi(magnitude - 1);
    let two_sig = (in_thousands / scale).round() * scale;
    format!("{}K", two_sig.round() as i64)
}

/// Display form of an item name: the first `*` becomes a star glyph.
pub fn display_name(name: &str) -> String {
    name.replacen('*', "\u{2605}", 1)
}
