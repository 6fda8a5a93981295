mod support;

use std::sync::Arc;
use std::time::Duration;

use booking_core::config::GeocodingConfig;
use booking_core::geo::GeoPoint;
use booking_core::geocode::AddressResolver;

use support::FakeGeocoder;

fn config() -> GeocodingConfig {
    GeocodingConfig::default()
}

fn bengaluru() -> GeoPoint {
    GeoPoint::new("MG Road, Bengaluru", 12.975, 77.606)
}

fn partial_match() -> GeoPoint {
    GeoPoint::new("MG Ro (approx)", 12.9, 77.6)
}

#[tokio::test(start_paused = true)]
async fn newer_query_supersedes_the_older_one() {
    // Two queries 100 ms apart: the first is still inside its debounce
    // window when the second arrives, so it never reaches the network and
    // only the second's result is published.
    let geocoder = Arc::new(
        FakeGeocoder::new(Duration::from_millis(50))
            .with_candidates("MG Ro", vec![partial_match()])
            .with_candidates("MG Road", vec![bengaluru()]),
    );
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    resolver.push_input("MG Ro");
    tokio::time::sleep(Duration::from_millis(100)).await;
    resolver.push_input("MG Road");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(geocoder.queries(), vec!["MG Road".to_string()]);
    assert_eq!(*resolver.candidates().borrow(), vec![bengaluru()]);
}

#[tokio::test(start_paused = true)]
async fn stale_in_flight_response_is_discarded() {
    // Here the first lookup has already hit the network when the newer
    // query lands; its late response must never be applied.
    let geocoder = Arc::new(
        FakeGeocoder::new(Duration::from_millis(500))
            .with_candidates("MG Ro", vec![partial_match()])
            .with_candidates("MG Road", vec![bengaluru()]),
    );
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    resolver.push_input("MG Ro");
    tokio::time::sleep(Duration::from_millis(400)).await;
    resolver.push_input("MG Road");
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(
        geocoder.queries(),
        vec!["MG Ro".to_string(), "MG Road".to_string()]
    );
    assert_eq!(*resolver.candidates().borrow(), vec![bengaluru()]);
}

#[tokio::test(start_paused = true)]
async fn short_queries_never_reach_the_network() {
    let geocoder = Arc::new(FakeGeocoder::new(Duration::from_millis(50)));
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    resolver.push_input("M");
    resolver.push_input("MG");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(geocoder.queries().is_empty());
    assert!(resolver.candidates().borrow().is_empty());
}

#[tokio::test(start_paused = true)]
async fn only_the_settled_text_triggers_a_lookup() {
    let geocoder = Arc::new(
        FakeGeocoder::new(Duration::from_millis(50))
            .with_candidates("MG Road", vec![bengaluru()]),
    );
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    // Keystrokes arriving faster than the debounce window.
    for text in ["MG ", "MG R", "MG Ro", "MG Roa", "MG Road"] {
        resolver.push_input(text);
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(geocoder.queries(), vec!["MG Road".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn selection_suppresses_lookups_until_the_text_is_edited() {
    let geocoder = Arc::new(
        FakeGeocoder::new(Duration::from_millis(50))
            .with_candidates("MG Road", vec![bengaluru()])
            .with_candidates("MG Road, Bengaluru east", vec![bengaluru()]),
    );
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    resolver.push_input("MG Road");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(geocoder.queries().len(), 1);

    let choice = bengaluru();
    resolver.mark_selected(&choice);
    assert!(resolver.candidates().borrow().is_empty(), "dropdown closed");

    // The selected label lands back in the input; that is not an edit.
    resolver.push_input(&choice.label);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(geocoder.queries().len(), 1);

    // An actual edit re-enables lookups.
    resolver.push_input("MG Road, Bengaluru east");
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(geocoder.queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn selection_cancels_an_in_flight_lookup() {
    let geocoder = Arc::new(
        FakeGeocoder::new(Duration::from_millis(500))
            .with_candidates("MG Road", vec![bengaluru()]),
    );
    let resolver = AddressResolver::new(geocoder.clone(), &config());

    resolver.push_input("MG Road");
    // Past the debounce, inside the network delay.
    tokio::time::sleep(Duration::from_millis(400)).await;
    resolver.mark_selected(&bengaluru());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(
        resolver.candidates().borrow().is_empty(),
        "late response not applied after selection"
    );
}
