use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bike_bazaar::query::{KeyFamily, QueryClient, QueryKey, QueryOptions, QueryStatus};
use bike_bazaar::{Listing, Message, StoreError, StoreResult};
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;

const MINUTE: Duration = Duration::from_secs(60);

type Fetch = BoxFuture<'static, StoreResult<bool>>;

/// Fetcher answering `value` after `delay`, counting each call
fn counted(calls: &Arc<AtomicUsize>, delay: Duration, value: bool) -> impl FnOnce() -> Fetch {
    let calls = Arc::clone(calls);
    move || {
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(value)
        })
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_reads_share_one_fetch() {
    let client = QueryClient::new();
    let options = QueryOptions::fresh_for(MINUTE);
    let calls = Arc::new(AtomicUsize::new(0));

    let slow = Duration::from_millis(50);

    let (a, b, c) = tokio::join!(
        client.query::<bool, _, _>(QueryKey::IsFounder, options, counted(&calls, slow, true)),
        client.query::<bool, _, _>(QueryKey::IsFounder, options, counted(&calls, slow, true)),
        client.query::<bool, _, _>(QueryKey::IsFounder, options, counted(&calls, slow, true)),
    );

    assert_eq!((a, b, c), (Ok(true), Ok(true), Ok(true)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn values_go_stale_after_their_window() {
    let client = QueryClient::new();
    let options = QueryOptions::fresh_for(MINUTE);
    let calls = Arc::new(AtomicUsize::new(0));

    let read = || {
        client.query::<bool, _, _>(
            QueryKey::IsFounder,
            options,
            counted(&calls, Duration::ZERO, true),
        )
    };
    read().await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    read().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!client.snapshot::<bool>(&QueryKey::IsFounder).is_stale);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(client.snapshot::<bool>(&QueryKey::IsFounder).is_stale);
    read().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn family_invalidation_leaves_other_families_alone() {
    let client = QueryClient::new();
    let options = QueryOptions::fresh_for(MINUTE);
    client.set(QueryKey::Listings, Vec::<Listing>::new(), options);
    client.set(QueryKey::ListingsByBrand("honda".to_string()), Vec::<Listing>::new(), options);
    client.set(QueryKey::IsFounder, true, options);

    let touched = client.invalidate(&[KeyFamily::Listings.into()]);

    assert_eq!(touched, 2);
    assert!(client.snapshot::<Vec<Listing>>(&QueryKey::Listings).is_stale);
    let by_brand = QueryKey::ListingsByBrand("honda".to_string());
    assert!(client.snapshot::<Vec<Listing>>(&by_brand).is_stale);
    assert!(!client.snapshot::<bool>(&QueryKey::IsFounder).is_stale);
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_value() {
    let client = QueryClient::new();
    let options = QueryOptions::fresh_for(MINUTE);
    client.set(QueryKey::IsFounder, true, options);
    client.invalidate(&[QueryKey::IsFounder.into()]);

    let result = client
        .query::<bool, _, _>(QueryKey::IsFounder, options, || async {
            Err(StoreError::Transport("connection refused".to_string()))
        })
        .await;

    assert_eq!(
        result,
        Err(StoreError::Transport("connection refused".to_string()))
    );
    let snapshot = client.snapshot::<bool>(&QueryKey::IsFounder);
    assert_eq!(snapshot.status, QueryStatus::Error);
    assert_eq!(snapshot.data, Some(true));
    assert!(snapshot.error.is_some());
}

#[tokio::test]
async fn not_found_is_reported_as_such() {
    let client = QueryClient::new();
    let key = QueryKey::Listing("gone".to_string());
    let result = client
        .query::<Listing, _, _>(key, QueryOptions::fresh_for(MINUTE), || async {
            Err(StoreError::not_found("listing gone"))
        })
        .await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn invalidation_detaches_an_in_flight_fetch() {
    let client = QueryClient::new();
    let options = QueryOptions::fresh_for(MINUTE);
    let calls = Arc::new(AtomicUsize::new(0));

    let slow = counted(&calls, Duration::from_millis(50), true);
    let quick = counted(&calls, Duration::from_millis(10), false);

    let (early, late) = tokio::join!(
        client.query::<bool, _, _>(QueryKey::IsFounder, options, slow),
        async {
            tokio::task::yield_now().await;
            client.invalidate(&[QueryKey::IsFounder.into()]);
            client
                .query::<bool, _, _>(QueryKey::IsFounder, options, quick)
                .await
        }
    );

    // The detached fetch still answers its own reader
    assert_eq!(early, Ok(true));
    assert_eq!(late, Ok(false));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    // but only the fetch started after the invalidation is cached
    assert_eq!(client.snapshot::<bool>(&QueryKey::IsFounder).data, Some(false));
}

#[tokio::test(start_paused = true)]
async fn polling_stops_when_the_handle_is_dropped() {
    let client = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let handle = {
        let calls = Arc::clone(&calls);
        client.poll(
            QueryKey::Messages("listing-1".to_string()),
            QueryOptions::fresh_for(Duration::from_secs(5)),
            Duration::from_secs(5),
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::<Message>::new())
                }
            },
        )
    };

    // Ticks at 0s, 5s and 10s
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let thread = client.snapshot::<Vec<Message>>(&QueryKey::Messages("listing-1".to_string()));
    assert_eq!(thread.status, QueryStatus::Success);

    handle.stop();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn snapshot_shows_loading_until_the_first_fetch_lands() {
    let client = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let reader = {
        let client = client.clone();
        let fetch = counted(&calls, Duration::from_secs(5), true);
        tokio::spawn(async move {
            client
                .query::<bool, _, _>(QueryKey::IsFounder, QueryOptions::fresh_for(MINUTE), fetch)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(1)).await;
    let loading = client.snapshot::<bool>(&QueryKey::IsFounder);
    assert_eq!(loading.status, QueryStatus::Loading);
    assert!(loading.is_fetching);
    assert_eq!(loading.data, None);

    assert_eq!(reader.await.unwrap(), Ok(true));
    let done = client.snapshot::<bool>(&QueryKey::IsFounder);
    assert_eq!(done.status, QueryStatus::Success);
    assert!(!done.is_fetching);
}

#[tokio::test(start_paused = true)]
async fn dropped_reader_still_records_the_fetch() {
    let client = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let reader = {
        let client = client.clone();
        let fetch = counted(&calls, Duration::from_secs(5), true);
        tokio::spawn(async move {
            client
                .query::<bool, _, _>(QueryKey::IsFounder, QueryOptions::fresh_for(MINUTE), fetch)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;
    reader.abort();
    assert!(reader.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_secs(10)).await;

    let snapshot = client.snapshot::<bool>(&QueryKey::IsFounder);
    assert_eq!(snapshot.status, QueryStatus::Success);
    assert!(!snapshot.is_fetching);
    assert_eq!(snapshot.data, Some(true));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // and the recorded value is served without another fetch
    let cached = client
        .query::<bool, _, _>(
            QueryKey::IsFounder,
            QueryOptions::fresh_for(MINUTE),
            counted(&calls, Duration::ZERO, false),
        )
        .await;
    assert_eq!(cached, Ok(true));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
