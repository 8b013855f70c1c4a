use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tripwindow_trip_finder::{
    Airport, DatePair, Flight, FlightGateway, FlightQuery, Result, TripError, TripSearchDriver,
};

fn cph() -> Airport {
    Airport::new("CPH", "Kastrup", "Copenhagen", "Denmark")
}

fn dest(code: &str) -> Airport {
    Airport::new(code, code, code, "Somewhere")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 10, d).unwrap()
}

fn at(d: u32, hour: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, 0, 0).unwrap()
}

type Route = (String, String, NaiveDate);

#[derive(Default)]
struct FakeGateway {
    flights: HashMap<Route, Vec<Flight>>,
    failing: Option<String>,
    delay: Duration,
    calls: Mutex<Vec<Route>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    snapshots: AtomicUsize,
}

impl FakeGateway {
    fn with_flight(mut self, from: Airport, to: Airport, d: u32, price: f64) -> Self {
        let flight = Flight::new(from.clone(), to.clone(), at(d, 9), at(d, 12), price, 0).unwrap();
        self.flights
            .entry((from.code, to.code, day(d)))
            .or_default()
            .push(flight);
        self
    }
}

impl FlightGateway for FakeGateway {
    async fn lookup_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let route = (query.from.code.clone(), query.to.code.clone(), query.date);
        self.calls.lock().unwrap().push(route.clone());
        if self.failing.as_deref() == Some(query.to.code.as_str()) {
            return Err(TripError::LookupFailed(anyhow::anyhow!("provider down")));
        }
        Ok(self.flights.get(&route).cloned().unwrap_or_default())
    }

    async fn snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_options_follow_date_then_destination_order() {
    let gateway = FakeGateway::default()
        .with_flight(cph(), dest("AGP"), 5, 100.0)
        .with_flight(dest("AGP"), cph(), 7, 90.0)
        .with_flight(cph(), dest("PMI"), 6, 80.0);
    let driver = TripSearchDriver::new(Arc::new(gateway)).max_concurrent_lookups(4);
    let dates = vec![
        DatePair::new(day(5), day(7)).unwrap(),
        DatePair::new(day(6), day(8)).unwrap(),
    ];
    let destinations = vec![dest("AGP"), dest("PMI"), dest("OLB")];

    let options = driver.fetch_options(&dates, &cph(), &destinations).await.unwrap();

    let order: Vec<_> = options
        .iter()
        .map(|o| (o.date_pair.departure, o.destination.code.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (day(5), "AGP"),
            (day(5), "PMI"),
            (day(5), "OLB"),
            (day(6), "AGP"),
            (day(6), "PMI"),
            (day(6), "OLB"),
        ]
    );
    assert_eq!(options[0].outbound.len(), 1);
    assert_eq!(options[0].inbound[0].price(), 90.0);
    assert!(options[1].outbound.is_empty());
    assert_eq!(options[4].outbound[0].price(), 80.0);
    assert_eq!(driver.gateway().snapshots.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_each_option_looks_up_both_directions() {
    let driver = TripSearchDriver::new(Arc::new(FakeGateway::default()));
    let dates = vec![DatePair::new(day(5), day(7)).unwrap()];

    driver.fetch_options(&dates, &cph(), &[dest("AGP")]).await.unwrap();

    let calls = driver.gateway().calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("CPH".to_string(), "AGP".to_string(), day(5)),
            ("AGP".to_string(), "CPH".to_string(), day(7)),
        ]
    );
}

#[tokio::test]
async fn test_lookup_failure_aborts_the_search() {
    let gateway = FakeGateway {
        failing: Some("PMI".to_string()),
        ..FakeGateway::default()
    };
    let driver = TripSearchDriver::new(Arc::new(gateway));
    let dates = vec![DatePair::new(day(5), day(7)).unwrap()];

    let err = driver
        .fetch_options(&dates, &cph(), &[dest("AGP"), dest("PMI")])
        .await
        .unwrap_err();
    assert!(matches!(err, TripError::LookupFailed(_)));
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let destinations: Vec<_> = ["AGP", "PMI", "OLB", "ALC", "SVQ", "FAO"]
        .into_iter()
        .map(dest)
        .collect();
    let dates = vec![DatePair::new(day(5), day(7)).unwrap()];

    for limit in [1u64, 3] {
        let gateway = FakeGateway {
            delay: Duration::from_millis(5),
            ..FakeGateway::default()
        };
        let driver = TripSearchDriver::new(Arc::new(gateway)).max_concurrent_lookups(limit);
        let options = driver.fetch_options(&dates, &cph(), &destinations).await.unwrap();

        assert_eq!(options.len(), destinations.len());
        let peak = driver.gateway().peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= limit as usize, "peak {peak} over limit {limit}");
    }
}

#[tokio::test]
async fn test_no_dates_means_no_lookups() {
    let driver = TripSearchDriver::new(Arc::new(FakeGateway::default()));
    let options = driver.fetch_options(&[], &cph(), &[dest("AGP")]).await.unwrap();
    assert!(options.is_empty());
    assert!(driver.gateway().calls.lock().unwrap().is_empty());
}
