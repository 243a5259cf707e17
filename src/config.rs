use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.romexchange.com";
pub const API_PATH: &str = "/api";
pub const NAMES_PATH: &str = "/items.json";

/// Longest dashboard URL handed out; older browsers and chat clients choke past this.
pub const MAX_URL_LEN: usize = 2000;

/// Inactivity window before a free-text search is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Delay used when focusing the search box clears an existing search.
pub const FOCUS_CLEAR_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Distance in pixels from the bottom of the list at which the on-deck page is merged.
pub const SCROLL_THRESHOLD_PX: f64 = 500.0;

/// Page size used when answering queries from local fixture files.
pub const FIXTURE_PAGE_SIZE: usize = 10;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn fixture_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("items", "mockdata.json"),
        ("names", "items.json"),
    ])
}
