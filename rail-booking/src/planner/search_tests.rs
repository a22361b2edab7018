//! Scenario tests for itinerary search.

use super::*;
use crate::catalog::{LegFilter, RouteCatalog};
use crate::domain::{ClockTime, Fare, Itinerary, Leg, LegId, Location, OperatingDays, TravelClass};
use chrono::Weekday;

fn loc(s: &str) -> Location {
    Location::parse(s).unwrap()
}

fn time(s: &str) -> ClockTime {
    ClockTime::parse_hhmm(s).unwrap()
}

/// Leg with a second-class fare; first class is double.
fn leg(id: &str, from: &str, to: &str, dep: &str, arr: &str, fare: u64) -> Leg {
    Leg::new(
        LegId::parse(id).unwrap(),
        loc(from),
        loc(to),
        time(dep),
        time(arr),
        None,
    )
    .unwrap()
    .with_carrier("IC")
    .with_fares(Fare::from_cents(fare * 2), Fare::from_cents(fare))
}

fn catalog(legs: Vec<Leg>) -> RouteCatalog {
    RouteCatalog::new(legs).unwrap()
}

fn search(catalog: &RouteCatalog, query: &SearchQuery) -> Vec<String> {
    let config = SearchConfig::default();
    Planner::new(catalog, &config)
        .search(query)
        .unwrap()
        .itineraries
        .iter()
        .map(|i| i.signature().to_string())
        .collect()
}

fn query(from: &str, to: &str) -> SearchQuery {
    SearchQuery::new(loc(from), loc(to))
}

fn europe() -> RouteCatalog {
    catalog(vec![
        leg("R1", "Paris", "Berlin", "08:30", "16:45", 120),
        leg("R2", "Berlin", "Prague", "18:00", "22:30", 40),
        leg("R3", "Paris", "Prague", "07:00", "20:00", 250),
        leg("R4", "Berlin", "Vienna", "17:15", "21:00", 60),
        leg("R5", "Vienna", "Prague", "21:30", "23:30", 30),
    ])
}

#[test]
fn scenario_daytime_transfer_accepted() {
    let catalog = catalog(vec![
        leg("R1", "Paris", "Berlin", "08:30", "16:45", 120),
        leg("R2", "Berlin", "Prague", "18:00", "22:30", 40),
    ]);

    let results = search(&catalog, &query("Paris", "Prague"));
    assert_eq!(results, ["R1>R2"]);

    let config = SearchConfig::default();
    let result = Planner::new(&catalog, &config)
        .search(&query("Paris", "Prague"))
        .unwrap();
    let it = &result.itineraries[0];
    assert_eq!(it.transfers().next().unwrap().gap_minutes, 75);
    assert_eq!(it.total_duration_minutes(), 495 + 75 + 270);
    assert_eq!(it.price(TravelClass::Second).cents(), 160);
}

#[test]
fn scenario_after_hours_transfer_depends_on_mode() {
    let catalog = catalog(vec![
        leg("N1", "Munich", "Zurich", "19:00", "23:00", 50),
        leg("N2", "Zurich", "Milan", "23:45", "03:00", 50),
    ]);

    let strict = query("Munich", "Milan");
    assert!(search(&catalog, &strict).is_empty());

    let mut lenient = query("Munich", "Milan");
    lenient.policy = PolicyMode::Lenient;
    assert_eq!(search(&catalog, &lenient), ["N1>N2"]);
}

#[test]
fn direct_results_and_pricing() {
    let catalog = europe();
    let mut q = query("Paris", "Prague");
    q.max_transfers = 0;

    let config = SearchConfig::default();
    let result = Planner::new(&catalog, &config).search(&q).unwrap();
    assert_eq!(result.itineraries.len(), 1);

    let direct = &result.itineraries[0];
    assert_eq!(direct.total_duration_minutes(), 13 * 60);
    assert_eq!(direct.price(TravelClass::First).cents(), 500);
}

#[test]
fn enumerates_up_to_two_transfers() {
    let catalog = europe();
    let results = search(&catalog, &query("Paris", "Prague"));

    // R1>R4>R5: 16:45→17:15 (30 min) and 21:00→21:30 (30 min)
    assert_eq!(results.len(), 3);
    assert!(results.contains(&"R3".to_string()));
    assert!(results.contains(&"R1>R2".to_string()));
    assert!(results.contains(&"R1>R4>R5".to_string()));
}

#[test]
fn max_transfers_bounds_legs() {
    let catalog = europe();
    let mut q = query("Paris", "Prague");
    q.max_transfers = 1;

    let results = search(&catalog, &q);
    assert_eq!(results.len(), 2);
    assert!(!results.contains(&"R1>R4>R5".to_string()));
}

#[test]
fn sort_by_duration_and_price() {
    let catalog = europe();

    // Durations: R1>R2 840, R1>R4>R5 900, R3 780
    let by_duration = search(&catalog, &query("Paris", "Prague"));
    assert_eq!(by_duration, ["R3", "R1>R2", "R1>R4>R5"]);

    // Second-class prices: R1>R2 160, R1>R4>R5 210, R3 250
    let mut q = query("Paris", "Prague");
    q.sort = SortKey::Price;
    assert_eq!(search(&catalog, &q), ["R1>R2", "R1>R4>R5", "R3"]);
}

#[test]
fn min_transfer_floor_applies_before_policy() {
    let catalog = europe();
    let mut q = query("Paris", "Prague");
    q.min_transfer_mins = 45;

    // R1→R4 has only 30 minutes
    assert_eq!(search(&catalog, &q), ["R3", "R1>R2"]);
}

#[test]
fn transfer_too_short_rejected() {
    let catalog = catalog(vec![
        leg("A", "Lyon", "Dijon", "08:00", "09:00", 10),
        leg("B", "Dijon", "Metz", "09:10", "11:00", 10),
    ]);
    assert!(search(&catalog, &query("Lyon", "Metz")).is_empty());
}

#[test]
fn overnight_leg_and_next_day_transfer() {
    let catalog = catalog(vec![
        leg("NJ", "Vienna", "Venice", "21:00", "05:30", 80),
        leg("RV", "Venice", "Florence", "06:00", "08:15", 20),
    ]);

    let config = SearchConfig::default();
    let result = Planner::new(&catalog, &config)
        .search(&query("Vienna", "Florence"))
        .unwrap();
    let it = &result.itineraries[0];

    assert_eq!(it.signature().to_string(), "NJ>RV");
    assert_eq!(it.total_duration_minutes(), 510 + 30 + 135);
    assert_eq!(it.arrival_day_offset(), 1);
}

#[test]
fn transfer_across_midnight_gap() {
    // Arrive 23:50, leave 00:10 the next day
    let catalog = catalog(vec![
        leg("L1", "Hamburg", "Copenhagen", "19:00", "23:50", 60),
        leg("L2", "Copenhagen", "Malmo", "00:10", "00:50", 10),
    ]);
    let config = SearchConfig::default();
    let result = Planner::new(&catalog, &config)
        .search(&query("Hamburg", "Malmo"))
        .unwrap();
    let it = &result.itineraries[0];
    assert_eq!(it.transfer_minutes(), 20);
    assert_eq!(it.total_duration_minutes(), 290 + 20 + 40);
}

#[test]
fn filters_apply_to_every_leg() {
    let catalog = catalog(vec![
        leg("A", "Paris", "Lyon", "08:00", "10:00", 10).with_carrier("TGV"),
        leg("B", "Lyon", "Nice", "10:30", "13:00", 10).with_carrier("TER"),
        leg("C", "Lyon", "Nice", "11:00", "13:30", 10)
            .with_carrier("TGV")
            .with_operating_days(OperatingDays::parse("Sat,Sun").unwrap()),
    ]);

    let mut q = query("Paris", "Nice");
    q.filter = LegFilter {
        carrier: Some("tgv".to_string()),
        day: None,
    };
    assert_eq!(search(&catalog, &q), ["A>C"]);

    q.filter.day = Some(Weekday::Mon);
    assert!(search(&catalog, &q).is_empty());
}

#[test]
fn locations_match_case_insensitively() {
    let catalog = europe();
    let results = search(&catalog, &query("PARIS", "prague"));
    assert_eq!(results.len(), 3);
}

#[test]
fn unknown_locations_give_empty_result() {
    let catalog = europe();
    assert!(search(&catalog, &query("Atlantis", "Prague")).is_empty());
    assert!(search(&catalog, &query("Paris", "Atlantis")).is_empty());
}

#[test]
fn never_revisits_a_location() {
    let catalog = catalog(vec![
        leg("A", "X", "Y", "08:00", "09:00", 1),
        leg("B", "Y", "X", "09:30", "10:00", 1),
        leg("C", "X", "Z", "10:30", "11:00", 1),
        leg("D", "Y", "Z", "09:30", "10:30", 1),
    ]);
    // A>B>C would pass back through X
    assert_eq!(search(&catalog, &query("X", "Z")), ["C", "A>D"]);
}

#[test]
fn invalid_queries_rejected() {
    let catalog = europe();
    let config = SearchConfig::default();
    let planner = Planner::new(&catalog, &config);

    let mut q = query("Paris", "Prague");
    q.max_transfers = 3;
    assert!(matches!(
        planner.search(&q),
        Err(SearchError::InvalidRequest(_))
    ));

    assert!(planner.search(&query("Paris", "paris")).is_err());

    let mut q = query("Paris", "Prague");
    q.limit = Some(0);
    assert!(planner.search(&q).is_err());
}

#[test]
fn limit_truncates_ranked_results() {
    let catalog = europe();
    let mut q = query("Paris", "Prague");
    q.limit = Some(2);
    assert_eq!(search(&catalog, &q), ["R3", "R1>R2"]);
}

#[test]
fn search_is_idempotent() {
    let catalog = europe();
    let q = query("Paris", "Prague");
    assert_eq!(search(&catalog, &q), search(&catalog, &q));
}

#[test]
fn reports_candidates_examined() {
    let catalog = europe();
    let config = SearchConfig::default();
    let result = Planner::new(&catalog, &config)
        .search(&query("Paris", "Prague"))
        .unwrap();
    assert!(result.candidates_examined >= result.itineraries.len());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const PLACES: [&str; 5] = ["A", "B", "C", "D", "E"];

    fn arb_leg(index: usize) -> impl Strategy<Value = Option<Leg>> {
        (0..PLACES.len(), 0..PLACES.len(), 0u32..1440, 1u32..600, 0u64..100).prop_map(
            move |(from, to, dep, dur, fare)| {
                if from == to {
                    return None;
                }
                let departure = ClockTime::from_minutes(dep).unwrap();
                let arrival = ClockTime::from_minutes((dep + dur) % 1440).unwrap();
                Some(
                    Leg::new(
                        LegId::new(format!("L{index}")).unwrap(),
                        loc(PLACES[from]),
                        loc(PLACES[to]),
                        departure,
                        arrival,
                        None,
                    )
                    .unwrap()
                    .with_fares(Fare::from_cents(fare * 2), Fare::from_cents(fare)),
                )
            },
        )
    }

    fn arb_catalog() -> impl Strategy<Value = RouteCatalog> {
        (1usize..25)
            .prop_flat_map(|n| (0..n).map(arb_leg).collect::<Vec<_>>())
            .prop_map(|legs| catalog(legs.into_iter().flatten().collect()))
    }

    fn run(catalog: &RouteCatalog, q: &SearchQuery) -> Vec<Itinerary> {
        let config = SearchConfig::default();
        Planner::new(catalog, &config).search(q).unwrap().itineraries
    }

    proptest! {
        /// Every transfer in every result satisfies the floor and the policy
        #[test]
        fn results_respect_transfer_rules(
            catalog in arb_catalog(),
            lenient in any::<bool>(),
            min_transfer in 0u32..60,
        ) {
            let mut q = query("A", "E");
            q.min_transfer_mins = min_transfer;
            q.policy = if lenient { PolicyMode::Lenient } else { PolicyMode::Strict };
            let policy = SearchConfig::default().layover.with_mode(q.policy);

            for it in run(&catalog, &q) {
                prop_assert_eq!(it.origin(), &q.origin);
                prop_assert_eq!(it.destination(), &q.destination);
                prop_assert!(it.leg_count() <= 3);
                for t in it.transfers() {
                    prop_assert!(t.gap_minutes >= min_transfer);
                    prop_assert!(policy.evaluate(t.arrival, t.departure).is_ok());
                }
            }
        }

        /// No two results share a leg sequence
        #[test]
        fn results_are_unique(catalog in arb_catalog()) {
            let results = run(&catalog, &query("A", "E"));
            let unique: HashSet<_> = results.iter().map(|i| i.signature().clone()).collect();
            prop_assert_eq!(unique.len(), results.len());
        }

        /// Results come back sorted by duration
        #[test]
        fn results_sorted_by_duration(catalog in arb_catalog()) {
            let results = run(&catalog, &query("A", "E"));
            for pair in results.windows(2) {
                prop_assert!(pair[0].total_duration_minutes() <= pair[1].total_duration_minutes());
            }
        }

        /// Direct results are exactly the matching catalog legs
        #[test]
        fn direct_results_match_catalog(catalog in arb_catalog()) {
            let mut q = query("A", "E");
            q.max_transfers = 0;
            let results = run(&catalog, &q);
            let expected = catalog
                .legs()
                .iter()
                .filter(|l| l.origin() == &q.origin && l.destination() == &q.destination)
                .count();
            prop_assert_eq!(results.len(), expected);
            for it in &results {
                let leg = &it.legs()[0];
                prop_assert_eq!(it.total_duration_minutes(), leg.duration_minutes());
                prop_assert_eq!(it.price(TravelClass::Second), leg.fare(TravelClass::Second));
            }
        }
    }
}
