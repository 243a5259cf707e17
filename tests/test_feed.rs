//! Tests for the paginated feed controller.

mod common;

use std::time::{Duration, Instant};

use common::{item, names, page, FailingSource, PagedSource};
use rom_exchange_sdk::feed::{Debouncer, EmptyState, FeedPhase};
use rom_exchange_sdk::models::{Direction, Item, ItemType, QueryOptions, Range, Server, Sort};
use rom_exchange_sdk::{Feed, FeedEvent, FetchToken};

fn ok(items: Vec<Item>) -> Result<Vec<Item>, String> {
    Ok(items)
}

fn query(text: &str) -> QueryOptions {
    QueryOptions {
        item: text.to_string(),
        ..QueryOptions::default()
    }
}

/// Feed showing `first` with `second` prefetched on deck.
fn loaded_feed(first: Vec<Item>, second: Vec<Item>) -> Feed {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(first));
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(second));
    feed
}

// ---------------------------------------------------------------------------
// First page and prefetch
// ---------------------------------------------------------------------------

#[test]
fn new_feed_is_idle_and_requests_nothing() {
    let mut feed = Feed::default();
    assert_eq!(feed.phase(), FeedPhase::Idle);
    assert_eq!(feed.generation(), 0);
    assert!(feed.next_request().is_none());
}

#[test]
fn start_requests_first_page() {
    let mut feed = Feed::default();
    feed.start();
    assert!(feed.is_loading());

    let req = feed.next_request().unwrap();
    assert_eq!(req.token, FetchToken { generation: 1, page: 1 });
    assert_eq!(req.query.page, 1);
    assert!(feed.next_request().is_none());
}

#[test]
fn first_page_replaces_list_and_prefetches_next() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();

    let event = feed.on_response(req.token, ok(page("A", 10)));
    assert_eq!(event, FeedEvent::Replaced { count: 10 });
    assert_eq!(feed.phase(), FeedPhase::Ready);
    assert_eq!(feed.items().len(), 10);

    let prefetch = feed.next_request().unwrap();
    assert_eq!(prefetch.token.page, 2);
    assert_eq!(prefetch.query.page, 2);
    assert_eq!(feed.page(), 2);

    let event = feed.on_response(prefetch.token, ok(page("B", 10)));
    assert_eq!(event, FeedEvent::Prefetched { page: 2, count: 10 });
    assert_eq!(feed.on_deck().len(), 10);
    assert_eq!(feed.items().len(), 10);
}

#[test]
fn apply_query_forces_page_one() {
    let mut feed = Feed::default();
    feed.apply_query(QueryOptions::default().with_page(7));
    let req = feed.next_request().unwrap();
    assert_eq!(req.query.page, 1);
    assert_eq!(feed.query().page, 1);
}

// ---------------------------------------------------------------------------
// Scrolling
// ---------------------------------------------------------------------------

#[test]
fn scroll_with_empty_on_deck_is_noop() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 10)));
    let page_before = feed.page();

    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);
    assert_eq!(feed.items().len(), 10);
    assert_eq!(feed.page(), page_before);
}

#[test]
fn scroll_appends_on_deck_in_order_and_prefetches() {
    let mut feed = loaded_feed(page("A", 2), page("B", 3));
    assert_eq!(feed.page(), 2);

    let event = feed.on_scroll_near_end();
    assert_eq!(event, FeedEvent::Appended { count: 3 });
    assert_eq!(
        names(feed.items()),
        vec!["A 1", "A 2", "B 1", "B 2", "B 3"]
    );
    assert!(feed.on_deck().is_empty());
    assert_eq!(feed.page(), 3);

    let req = feed.next_request().unwrap();
    assert_eq!(req.token.page, 3);
}

#[test]
fn scroll_threshold_is_500_pixels() {
    let mut feed = loaded_feed(page("A", 10), page("B", 10));

    assert_eq!(feed.on_scroll(2000.0, 800.0), FeedEvent::Ignored);
    assert_eq!(feed.on_scroll(1301.0, 800.0), FeedEvent::Ignored);
    assert_eq!(feed.on_scroll(1300.0, 800.0), FeedEvent::Appended { count: 10 });
}

#[test]
fn second_scroll_before_prefetch_lands_is_noop() {
    let mut feed = loaded_feed(page("A", 10), page("B", 10));
    feed.on_scroll_near_end();
    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);
    assert_eq!(feed.items().len(), 20);
    assert_eq!(feed.page(), 3);
}

#[test]
fn empty_prefetch_stops_pagination() {
    let mut feed = loaded_feed(page("A", 10), Vec::new());
    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);
    assert!(feed.next_request().is_none());
}

// ---------------------------------------------------------------------------
// Stale responses
// ---------------------------------------------------------------------------

#[test]
fn rapid_queries_reflect_only_the_last() {
    let mut feed = Feed::default();

    feed.apply_query(query("a"));
    let first = feed.next_request().unwrap();
    feed.apply_query(query("ab"));
    let second = feed.next_request().unwrap();
    feed.apply_query(query("abc"));
    let third = feed.next_request().unwrap();

    assert_eq!(
        feed.on_response(third.token, ok(vec![item("abc")])),
        FeedEvent::Replaced { count: 1 }
    );
    assert_eq!(
        feed.on_response(first.token, ok(vec![item("a")])),
        FeedEvent::Discarded
    );
    assert_eq!(
        feed.on_response(second.token, ok(vec![item("ab")])),
        FeedEvent::Discarded
    );

    assert_eq!(names(feed.items()), vec!["abc"]);
    assert_eq!(feed.query().item, "abc");
}

#[test]
fn late_stale_response_does_not_clear_loading() {
    let mut feed = Feed::default();
    feed.apply_query(query("old"));
    let old = feed.next_request().unwrap();
    feed.apply_query(query("new"));

    assert_eq!(feed.on_response(old.token, ok(page("old", 3))), FeedEvent::Discarded);
    assert!(feed.is_loading());
    assert!(feed.items().is_empty());
}

#[test]
fn queued_requests_for_superseded_queries_are_skipped() {
    let mut feed = Feed::default();
    feed.apply_query(query("a"));
    feed.apply_query(query("b"));

    let req = feed.next_request().unwrap();
    assert_eq!(req.token.generation, 2);
    assert_eq!(req.query.item, "b");
    assert!(feed.next_request().is_none());
}

#[test]
fn prefetch_for_old_query_is_discarded() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 10)));
    let prefetch = feed.next_request().unwrap();

    feed.apply_query(query("potion"));
    assert_eq!(
        feed.on_response(prefetch.token, ok(page("B", 10))),
        FeedEvent::Discarded
    );
    assert!(feed.on_deck().is_empty());
}

#[test]
fn duplicate_first_page_response_is_discarded() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 10)));

    assert_eq!(feed.on_response(req.token, ok(page("X", 10))), FeedEvent::Discarded);
    assert_eq!(feed.items()[0].name, "A 1");
}

// ---------------------------------------------------------------------------
// Failures and empty state
// ---------------------------------------------------------------------------

#[test]
fn failed_first_page_keeps_list_and_clears_loading() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 4)));

    feed.apply_query(query("potion"));
    let req = feed.next_request().unwrap();
    let event = feed.on_response(req.token, Err::<Vec<Item>, _>("timed out"));

    assert_eq!(event, FeedEvent::Failed { page: 1 });
    assert!(!feed.is_loading());
    assert_eq!(feed.items().len(), 4);
    assert!(feed.empty_state().is_none());
}

#[test]
fn scroll_after_failed_prefetch_requeues_same_page() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 10)));
    let prefetch = feed.next_request().unwrap();

    let event = feed.on_response(prefetch.token, Err::<Vec<Item>, _>("502"));
    assert_eq!(event, FeedEvent::Failed { page: 2 });
    assert!(feed.on_deck().is_empty());
    assert!(feed.next_request().is_none());

    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Retried { page: 2 });
    assert_eq!(feed.page(), 2);
    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);

    let retry = feed.next_request().unwrap();
    assert_eq!(retry.token, prefetch.token);
    assert!(feed.next_request().is_none());

    assert_eq!(
        feed.on_response(retry.token, ok(page("B", 10))),
        FeedEvent::Prefetched { page: 2, count: 10 }
    );
    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Appended { count: 10 });
    assert_eq!(feed.items().len(), 20);
    assert_eq!(feed.page(), 3);
}

#[test]
fn new_query_forgets_failed_prefetch() {
    let mut feed = Feed::default();
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 10)));
    let prefetch = feed.next_request().unwrap();
    feed.on_response(prefetch.token, Err::<Vec<Item>, _>("502"));

    feed.apply_query(query("potion"));
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("P", 3)));
    let next = feed.next_request().unwrap();
    feed.on_response(next.token, ok(Vec::new()));
    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);
    assert!(feed.next_request().is_none());
}

#[test]
fn empty_first_page_sets_empty_state() {
    let mut feed = Feed::new(query("zzz"));
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(Vec::new()));

    assert_eq!(
        feed.empty_state(),
        Some(&EmptyState::NoResults { query: "zzz".into() })
    );
    assert_eq!(
        feed.empty_state().unwrap().to_string(),
        "No results found for \"zzz\"."
    );
}

#[test]
fn empty_state_names_the_category() {
    let mut feed = Feed::new(QueryOptions {
        item: "zzz".into(),
        item_type: ItemType::POTION,
        ..QueryOptions::default()
    });
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(Vec::new()));

    assert_eq!(
        feed.empty_state().unwrap().to_string(),
        "No results found for \"zzz\" under the \"Potion / Effect\" type."
    );
}

#[test]
fn new_query_clears_empty_state() {
    let mut feed = Feed::new(query("zzz"));
    feed.start();
    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(Vec::new()));
    assert!(feed.empty_state().is_some());

    feed.apply_query(query("red"));
    assert!(feed.empty_state().is_none());
}

// ---------------------------------------------------------------------------
// Search debounce
// ---------------------------------------------------------------------------

#[test]
fn keystrokes_within_window_coalesce_to_one_fetch() {
    let mut feed = Feed::default();
    let t0 = Instant::now();

    feed.search_text_changed("r", t0);
    feed.search_text_changed("re", t0 + Duration::from_millis(100));
    feed.search_text_changed("red", t0 + Duration::from_millis(300));
    assert_eq!(feed.search_text(), "red");
    assert_eq!(feed.query().item, "");
    assert!(feed.is_loading());

    assert!(!feed.poll_timer(t0 + Duration::from_millis(700)));
    assert!(feed.next_request().is_none());

    assert!(feed.poll_timer(t0 + Duration::from_millis(800)));
    let req = feed.next_request().unwrap();
    assert_eq!(req.query.item, "red");
    assert!(feed.next_request().is_none());
    assert!(feed.next_deadline().is_none());
}

#[test]
fn focusing_search_clears_it_after_a_second() {
    let mut feed = Feed::new(query("red"));
    feed.start();
    feed.next_request().unwrap();

    let t0 = Instant::now();
    feed.search_focused(t0);
    assert_eq!(feed.search_text(), "");
    assert!(!feed.poll_timer(t0 + Duration::from_millis(999)));
    assert!(feed.poll_timer(t0 + Duration::from_millis(1000)));
    assert_eq!(feed.query().item, "");
}

#[test]
fn focusing_empty_search_does_nothing() {
    let mut feed = Feed::default();
    feed.search_focused(Instant::now());
    assert!(feed.next_deadline().is_none());
    assert_eq!(feed.phase(), FeedPhase::Idle);
}

#[test]
fn filter_change_sends_pending_text_immediately() {
    let mut feed = Feed::default();
    let t0 = Instant::now();
    feed.search_text_changed("elu", t0);

    feed.set_item_type(ItemType(11));
    assert!(feed.next_deadline().is_none());

    let req = feed.next_request().unwrap();
    assert_eq!(req.query.item, "elu");
    assert_eq!(req.query.item_type, ItemType(11));
    assert!(!feed.poll_timer(t0 + Duration::from_secs(5)));
}

#[test]
fn sort_and_exact_changes_apply_immediately() {
    let mut feed = Feed::default();
    feed.set_sort(Sort::Diff, Direction::Asc);
    feed.set_server(Server::Sea);
    feed.set_exact(true);

    let req = feed.next_request().unwrap();
    assert_eq!(req.token.generation, 3);
    assert_eq!(req.query.sort.sort, Sort::Diff);
    assert_eq!(req.query.sort.direction, Direction::Asc);
    assert_eq!(req.query.sort.server, Server::Sea);
    assert!(req.query.exact);
}

#[test]
fn debouncer_fires_once() {
    let mut debouncer = Debouncer::default();
    let t0 = Instant::now();
    debouncer.arm(t0, Duration::from_millis(500));
    debouncer.arm(t0 + Duration::from_millis(400), Duration::from_millis(500));

    assert!(!debouncer.fire(t0 + Duration::from_millis(600)));
    assert!(debouncer.fire(t0 + Duration::from_millis(900)));
    assert!(debouncer.deadline().is_none());
    assert!(!debouncer.fire(t0 + Duration::from_secs(10)));
}

// ---------------------------------------------------------------------------
// Chart options and snapshot
// ---------------------------------------------------------------------------

#[test]
fn chart_options_follow_the_displayed_list() {
    let source = PagedSource::new(vec![page("A", 10)]);
    let mut feed = Feed::default();
    feed.start();
    feed.run_blocking(&source);
    assert_eq!(feed.chart_options().range, Range::Week);

    feed.set_range(Range::Month);
    assert_eq!(feed.chart_options().range, Range::Week);

    feed.run_blocking(&source);
    assert_eq!(feed.chart_options().range, Range::Month);
}

#[test]
fn snapshot_reports_loading() {
    let mut feed = Feed::default();
    feed.start();
    assert!(feed.snapshot().loading);

    let req = feed.next_request().unwrap();
    feed.on_response(req.token, ok(page("A", 2)));
    let snapshot = feed.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.empty_state.is_none());
}

// ---------------------------------------------------------------------------
// run_blocking
// ---------------------------------------------------------------------------

#[test]
fn run_blocking_pages_through_source() {
    let source = PagedSource::new(vec![page("A", 10), page("B", 10), page("C", 3)]);
    let mut feed = Feed::default();
    feed.start();

    assert_eq!(
        feed.run_blocking(&source),
        vec![
            FeedEvent::Replaced { count: 10 },
            FeedEvent::Prefetched { page: 2, count: 10 },
        ]
    );

    feed.on_scroll_near_end();
    assert_eq!(
        feed.run_blocking(&source),
        vec![FeedEvent::Prefetched { page: 3, count: 3 }]
    );

    feed.on_scroll_near_end();
    assert_eq!(
        feed.run_blocking(&source),
        vec![FeedEvent::Prefetched { page: 4, count: 0 }]
    );

    assert_eq!(feed.on_scroll_near_end(), FeedEvent::Ignored);
    assert_eq!(feed.items().len(), 23);
    assert_eq!(source.pages_requested(), vec![1, 2, 3, 4]);
}

#[test]
fn run_blocking_absorbs_errors() {
    let mut feed = Feed::default();
    feed.start();

    assert_eq!(
        feed.run_blocking(&FailingSource),
        vec![FeedEvent::Failed { page: 1 }]
    );
    assert!(!feed.is_loading());
    assert_eq!(
        feed.empty_state(),
        Some(&EmptyState::NoResults { query: String::new() })
    );
}

#[test]
fn sdk_feed_runs_against_fixtures() {
    let (sdk, _tmp) = common::setup_fixture_sdk();
    let mut feed = sdk.feed();
    feed.start();

    let events = sdk.run_feed(&mut feed);
    assert_eq!(events[0], FeedEvent::Replaced { count: 6 });
    assert_eq!(events[1], FeedEvent::Prefetched { page: 2, count: 0 });
    assert_eq!(feed.items()[0].name, "Blue Potion");
}
