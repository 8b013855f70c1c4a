use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tripwindow_trip_finder::flight_filters::filter_leg;
use tripwindow_trip_finder::{
    Airport, DatePair, FilterOptions, Flight, LegSelection, TripCandidate, TripOptions, reduce_all,
    reduce_trip, select_best_destinations,
};

fn cph() -> Airport {
    Airport::new("CPH", "Kastrup", "Copenhagen", "Denmark")
}

fn agp() -> Airport {
    Airport::new("AGP", "Costa del Sol", "Malaga", "Spain")
}

fn pmi() -> Airport {
    Airport::new("PMI", "Son Sant Joan", "Palma", "Spain")
}

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn flight(from: Airport, to: Airport, dep: NaiveDateTime, arr: NaiveDateTime, price: f64) -> Flight {
    Flight::new(from, to, dep, arr, price, 0).unwrap()
}

fn options(
    dest: Airport,
    departure: NaiveDate,
    return_date: NaiveDate,
    outbound: Vec<Flight>,
    inbound: Vec<Flight>,
) -> TripOptions {
    TripOptions {
        date_pair: DatePair::new(departure, return_date).unwrap(),
        destination: dest,
        outbound,
        inbound,
    }
}

fn relaxed() -> FilterOptions {
    FilterOptions {
        vacation_days: 10,
        ..FilterOptions::default()
    }
}

#[test]
fn test_late_arrival_loses_to_pricier_flight() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let trip = options(
        agp(),
        day(5),
        day(7),
        vec![
            flight(cph(), agp(), at(10, 5, 10), at(10, 5, 13), 100.0),
            flight(cph(), agp(), at(10, 5, 19), at(10, 5, 23), 80.0),
        ],
        vec![flight(agp(), cph(), at(10, 7, 9), at(10, 7, 13), 70.0)],
    );

    let candidate = reduce_trip(&trip, &relaxed()).unwrap();
    assert_eq!(candidate.outbound.price(), 100.0);
    assert_eq!(candidate.total_price(), 170.0);
}

#[test]
fn test_exact_full_days_need_morning_arrival_and_late_departure() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let trip = options(
        agp(),
        day(5),
        day(7),
        vec![
            flight(cph(), agp(), at(10, 5, 7), at(10, 5, 10), 50.0),
            flight(cph(), agp(), at(10, 5, 11), at(10, 5, 14), 40.0),
        ],
        vec![
            flight(agp(), cph(), at(10, 7, 18), at(10, 7, 21), 30.0),
            flight(agp(), cph(), at(10, 7, 22), at(10, 8, 1), 60.0),
        ],
    );
    let opts = FilterOptions {
        min_full_days: 3,
        remove_bad_flights: false,
        auto_extend_trip: false,
        ..FilterOptions::default()
    };

    let candidate = reduce_trip(&trip, &opts).unwrap();
    assert_eq!(candidate.outbound.arrival_time().hour(), 10);
    assert_eq!(candidate.inbound.departure_time().hour(), 22);
}

#[test]
fn test_after_work_departure_buys_an_extra_day() {
    // Friday 2030-09-06 to Sunday: landing on Friday costs one weekday.
    let day = |d| NaiveDate::from_ymd_opt(2030, 9, d).unwrap();
    let outbound = vec![
        flight(cph(), agp(), at(9, 6, 8), at(9, 6, 12), 50.0),
        flight(cph(), agp(), at(9, 6, 17), at(9, 6, 21), 90.0),
    ];
    let inbound = vec![flight(agp(), cph(), at(9, 8, 12), at(9, 8, 16), 70.0)];
    let trip = options(agp(), day(6), day(8), outbound, inbound);

    let extend = FilterOptions::default();
    assert_eq!(reduce_trip(&trip, &extend).unwrap().outbound.price(), 90.0);

    let no_extend = FilterOptions {
        auto_extend_trip: false,
        ..FilterOptions::default()
    };
    assert_eq!(reduce_trip(&trip, &no_extend).unwrap().outbound.price(), 50.0);
}

#[test]
fn test_no_after_work_departure_discards_candidate() {
    // Both outbounds leave Friday during working hours and the budget is zero.
    let day = |d| NaiveDate::from_ymd_opt(2030, 9, d).unwrap();
    let trip = options(
        agp(),
        day(6),
        day(8),
        vec![
            flight(cph(), agp(), at(9, 6, 8), at(9, 6, 12), 50.0),
            flight(cph(), agp(), at(9, 6, 16), at(9, 6, 20), 60.0),
        ],
        vec![flight(agp(), cph(), at(9, 8, 12), at(9, 8, 16), 70.0)],
    );

    for leg_selection in [LegSelection::Independent, LegSelection::Joint] {
        let opts = FilterOptions {
            leg_selection,
            ..FilterOptions::default()
        };
        assert!(reduce_trip(&trip, &opts).is_none(), "{leg_selection:?}");
    }
}

#[test]
fn test_exact_full_days_without_fitting_flights_discards_candidate() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let morning_out = flight(cph(), agp(), at(10, 5, 7), at(10, 5, 10), 50.0);
    let afternoon_out = flight(cph(), agp(), at(10, 5, 11), at(10, 5, 14), 40.0);
    let evening_back = flight(agp(), cph(), at(10, 7, 18), at(10, 7, 21), 30.0);
    let late_back = flight(agp(), cph(), at(10, 7, 22), at(10, 8, 1), 60.0);

    // Only an afternoon arrival, then only an early-evening departure.
    let cases = [
        (vec![afternoon_out], vec![late_back]),
        (vec![morning_out], vec![evening_back]),
    ];
    for (outbound, inbound) in cases {
        let trip = options(agp(), day(5), day(7), outbound, inbound);
        for leg_selection in [LegSelection::Independent, LegSelection::Joint] {
            let opts = FilterOptions {
                min_full_days: 3,
                remove_bad_flights: false,
                auto_extend_trip: false,
                leg_selection,
                ..FilterOptions::default()
            };
            assert!(reduce_trip(&trip, &opts).is_none(), "{leg_selection:?}");
        }
    }
}

#[test]
fn test_joint_selection_checks_every_combination() {
    // The overnight flight lands on Saturday and so costs no weekday;
    // the cheap morning flight lands on Friday.
    let day = |d| NaiveDate::from_ymd_opt(2030, 9, d).unwrap();
    let overnight = flight(cph(), agp(), at(9, 6, 21), at(9, 7, 1), 60.0);
    let morning = flight(cph(), agp(), at(9, 6, 8), at(9, 6, 11), 20.0);
    let trip = options(
        agp(),
        day(6),
        day(8),
        vec![overnight.clone(), morning.clone()],
        vec![flight(agp(), cph(), at(9, 8, 12), at(9, 8, 16), 70.0)],
    );
    let independent = FilterOptions {
        remove_bad_flights: false,
        ..FilterOptions::default()
    };
    let joint = FilterOptions {
        leg_selection: LegSelection::Joint,
        ..independent.clone()
    };

    assert_eq!(reduce_trip(&trip, &independent).unwrap().outbound, morning);
    assert_eq!(reduce_trip(&trip, &joint).unwrap().outbound, overnight);
}

#[test]
fn test_empty_leg_discards_candidate() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let trip = options(
        agp(),
        day(5),
        day(7),
        vec![flight(cph(), agp(), at(10, 5, 10), at(10, 5, 13), 100.0)],
        vec![flight(agp(), cph(), at(10, 7, 20), at(10, 7, 23), 70.0)],
    );
    assert!(reduce_trip(&trip, &relaxed()).is_none());
}

#[test]
fn test_leg_filters_are_idempotent() {
    let flights = vec![
        Flight::new(cph(), agp(), at(10, 5, 6), at(10, 5, 9), 10.0, 0).unwrap(),
        Flight::new(cph(), agp(), at(10, 5, 7), at(10, 5, 23), 20.0, 2).unwrap(),
        Flight::new(cph(), agp(), at(10, 5, 12), at(10, 5, 15), 30.0, 1).unwrap(),
        Flight::new(cph(), agp(), at(10, 5, 3), at(10, 5, 6), 40.0, 0).unwrap(),
    ];
    let refs: Vec<&Flight> = flights.iter().collect();
    let opts = FilterOptions {
        max_stops: 1,
        max_flight_duration: Some(5.0),
        ..FilterOptions::default()
    };

    let once = filter_leg(&refs, &opts);
    let twice = filter_leg(&once, &opts);
    assert_eq!(once, twice);
    assert_eq!(once.iter().map(|f| f.price()).collect::<Vec<_>>(), vec![10.0, 30.0]);
}

#[test]
fn test_reduction_returns_input_flights() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let trips: Vec<TripOptions> = (0..4)
        .map(|i| {
            options(
                agp(),
                day(5),
                day(7),
                (0..5)
                    .map(|j| flight(cph(), agp(), at(10, 5, 7 + j), at(10, 5, 10 + j), 100.0 + ((i * 7 + j * 13) % 11) as f64))
                    .collect(),
                (0..5)
                    .map(|j| flight(agp(), cph(), at(10, 7, 8 + j), at(10, 7, 11 + j), 90.0 + ((i * 3 + j * 5) % 7) as f64))
                    .collect(),
            )
        })
        .collect();

    let candidates = reduce_all(&trips, &relaxed());
    assert_eq!(candidates.len(), trips.len());
    for (trip, candidate) in trips.iter().zip(&candidates) {
        assert!(trip.outbound.contains(&candidate.outbound));
        assert!(trip.inbound.contains(&candidate.inbound));
        let min_out = trip.outbound.iter().map(|f| f.price()).fold(f64::MAX, f64::min);
        assert_eq!(candidate.outbound.price(), min_out);
    }
}

#[test]
fn test_selector_keeps_requested_destinations_with_candidates() {
    let day = |d| NaiveDate::from_ymd_opt(2030, 10, d).unwrap();
    let candidate = |dest: Airport, price: f64| TripCandidate {
        date_pair: DatePair::new(day(5), day(7)).unwrap(),
        destination: dest.clone(),
        outbound: flight(cph(), dest.clone(), at(10, 5, 9), at(10, 5, 12), price),
        inbound: flight(dest, cph(), at(10, 7, 9), at(10, 7, 12), 50.0),
    };
    let candidates = vec![
        candidate(agp(), 300.0),
        candidate(agp(), 200.0),
        candidate(agp(), 200.0),
        candidate(pmi(), 100.0),
    ];
    let olb = Airport::new("OLB", "Costa Smeralda", "Olbia", "Italy");

    let best = select_best_destinations(&candidates, &[agp(), olb]);
    assert_eq!(best.keys().collect::<Vec<_>>(), vec!["AGP"]);
    assert_eq!(best["AGP"].total_price(), 250.0);
}
