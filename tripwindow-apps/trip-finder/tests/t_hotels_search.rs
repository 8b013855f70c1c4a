use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use tripwindow_trip_finder::{
    Hotel, HotelFinder, HotelProvider, HotelQuery, HotelStore, OfflineHotels, TripError,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, d).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
}

fn hotel(name: &str, price: f64, checkin: u32, checkout: u32) -> Hotel {
    Hotel::new(name, "Malaga", "Spain", price, 8.0, day(checkin), day(checkout)).unwrap()
}

enum Reply {
    Hotels(Vec<Hotel>),
    UnknownCity,
    Down,
}

struct FakeProvider {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }
}

impl HotelProvider for FakeProvider {
    async fn fetch_hotels(&self, _query: &HotelQuery) -> anyhow::Result<Vec<Hotel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Hotels(h) => Ok(h.clone()),
            Reply::UnknownCity => Err(TripError::NotFound("city 'Malaga'".into()).into()),
            Reply::Down => anyhow::bail!("HTTP error 503"),
        }
    }
}

fn malaga(checkin: u32, checkout: u32) -> HotelQuery {
    HotelQuery::new("Malaga", "Spain", day(checkin), day(checkout))
}

#[tokio::test]
async fn test_live_results_are_sorted_and_stored() {
    let provider = FakeProvider::new(Reply::Hotels(vec![
        hotel("Alcazaba", 1200.0, 2, 9),
        hotel("Pedregalejo", 800.0, 2, 9),
        hotel("Soho", 950.0, 2, 9),
    ]));
    let finder = HotelFinder::new(HotelStore::in_memory(), provider).with_today(today);

    let hotels = finder.search_hotels(&malaga(2, 9)).await.unwrap();
    let names: Vec<_> = hotels.iter().map(|h| h.name()).collect();
    assert_eq!(names, vec!["Pedregalejo", "Soho", "Alcazaba"]);

    // A shorter stay inside the stored one is answered from the store.
    let again = finder.search_hotels(&malaga(3, 6)).await.unwrap();
    assert_eq!(again.len(), 3);
    assert_eq!(finder.into_store().len(), 3);
}

#[tokio::test]
async fn test_cache_hit_skips_provider() {
    let mut store = HotelStore::in_memory();
    store.add(hotel("Alcazaba", 1200.0, 1, 10));
    let finder = HotelFinder::new(store, FakeProvider::new(Reply::Down)).with_today(today);

    let hotels = finder.search_hotels(&malaga(2, 5)).await.unwrap();
    assert_eq!(hotels.len(), 1);
}

#[tokio::test]
async fn test_stored_offers_from_other_cities_do_not_match() {
    let mut store = HotelStore::in_memory();
    store.add(Hotel::new("Portixol", "Palma", "Spain", 700.0, 8.8, day(1), day(10)).unwrap());
    let finder = HotelFinder::new(store, OfflineHotels).with_today(today);

    assert!(finder.search_hotels(&malaga(2, 5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_queries_never_reach_the_provider() {
    let finder = HotelFinder::new(HotelStore::in_memory(), FakeProvider::new(Reply::Down))
        .with_today(|| NaiveDate::from_ymd_opt(2030, 5, 2).unwrap());

    let past = finder.search_hotels(&malaga(2, 9)).await.unwrap_err();
    assert!(matches!(past, TripError::InvalidParameter(_)));

    let inverted = finder.search_hotels(&malaga(9, 4)).await.unwrap_err();
    assert!(matches!(inverted, TripError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_provider_errors_are_classified() {
    let unknown = HotelFinder::new(HotelStore::in_memory(), FakeProvider::new(Reply::UnknownCity))
        .with_today(today);
    let err = unknown.search_hotels(&malaga(2, 9)).await.unwrap_err();
    assert!(matches!(err, TripError::NotFound(_)));

    let down = HotelFinder::new(HotelStore::in_memory(), FakeProvider::new(Reply::Down))
        .with_today(today);
    let err = down.search_hotels(&malaga(2, 9)).await.unwrap_err();
    assert!(matches!(err, TripError::LookupFailed(_)));
    assert!(err.to_string().contains("503"));
}
