//! Itinerary types.
//!
//! An `Itinerary` is an ordered chain of one to three legs where each leg
//! departs from the location the previous leg arrived at. Its identity is
//! the sequence of leg ids, captured by [`ItinerarySignature`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use super::leg_id::SIGNATURE_SEPARATOR;
use super::{ClockTime, DomainError, Fare, InvalidLegId, Leg, LegId, Location, TravelClass};

/// Most legs an itinerary may have (two transfers).
pub const MAX_LEGS: usize = 3;

/// The ordered leg ids that identify an itinerary.
///
/// Two itineraries are the same if and only if their signatures are equal.
/// The text form joins the ids with `>`, e.g. `"R1>R7"`.
///
/// # Examples
///
/// ```
/// use rail_booking::domain::ItinerarySignature;
///
/// let sig: ItinerarySignature = "R1>R7".parse().unwrap();
/// assert_eq!(sig.leg_ids().len(), 2);
/// assert_eq!(sig.to_string(), "R1>R7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItinerarySignature(Vec<LegId>);

impl ItinerarySignature {
    pub fn new(leg_ids: Vec<LegId>) -> Self {
        Self(leg_ids)
    }

    pub fn leg_ids(&self) -> &[LegId] {
        &self.0
    }
}

impl FromStr for ItinerarySignature {
    type Err = InvalidLegId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(SIGNATURE_SEPARATOR)
            .map(LegId::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for ItinerarySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{SIGNATURE_SEPARATOR}")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}

/// A change of train between two consecutive legs.
#[derive(Debug, Clone, Copy)]
pub struct Transfer<'a> {
    /// Where the change happens
    pub at: &'a Location,
    /// Arrival of the inbound leg
    pub arrival: ClockTime,
    /// Departure of the outbound leg
    pub departure: ClockTime,
    /// Wait between the two, wrapping past midnight if needed
    pub gap_minutes: u32,
}

/// A connected chain of catalog legs.
///
/// # Invariants
///
/// - Between 1 and [`MAX_LEGS`] legs
/// - Each leg departs from the previous leg's destination
#[derive(Debug, Clone)]
pub struct Itinerary {
    legs: Vec<Arc<Leg>>,
    signature: ItinerarySignature,
}

impl Itinerary {
    /// Constructs an itinerary from legs in travel order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - The list is empty or longer than [`MAX_LEGS`]
    /// - Consecutive legs don't connect
    pub fn new(legs: Vec<Arc<Leg>>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        if legs.len() > MAX_LEGS {
            return Err(DomainError::TooManyLegs(legs.len()));
        }

        for window in legs.windows(2) {
            let arrives = window[0].destination();
            let departs = window[1].origin();
            if arrives != departs {
                return Err(DomainError::LegsNotConnected(
                    arrives.clone(),
                    departs.clone(),
                ));
            }
        }

        let signature = ItinerarySignature(legs.iter().map(|l| l.id().clone()).collect());
        Ok(Self { legs, signature })
    }

    /// An itinerary consisting of a single leg.
    pub fn direct(leg: Arc<Leg>) -> Self {
        let signature = ItinerarySignature(vec![leg.id().clone()]);
        Self {
            legs: vec![leg],
            signature,
        }
    }

    pub fn legs(&self) -> &[Arc<Leg>] {
        &self.legs
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.legs.len() - 1
    }

    pub fn signature(&self) -> &ItinerarySignature {
        &self.signature
    }

    fn first(&self) -> &Leg {
        &self.legs[0]
    }

    fn last(&self) -> &Leg {
        &self.legs[self.legs.len() - 1]
    }

    pub fn origin(&self) -> &Location {
        self.first().origin()
    }

    pub fn destination(&self) -> &Location {
        self.last().destination()
    }

    pub fn departure(&self) -> ClockTime {
        self.first().departure()
    }

    pub fn arrival(&self) -> ClockTime {
        self.last().arrival()
    }

    /// The transfers between consecutive legs, in order.
    pub fn transfers(&self) -> impl Iterator<Item = Transfer<'_>> {
        self.legs.windows(2).map(|w| Transfer {
            at: w[0].destination(),
            arrival: w[0].arrival(),
            departure: w[1].departure(),
            gap_minutes: w[0].arrival().minutes_until(w[1].departure()),
        })
    }

    /// Sum of all transfer gaps.
    pub fn transfer_minutes(&self) -> u32 {
        self.transfers().map(|t| t.gap_minutes).sum()
    }

    /// Door-to-door minutes: every leg plus every transfer gap.
    pub fn total_duration_minutes(&self) -> u32 {
        let riding: u32 = self.legs.iter().map(|l| l.duration_minutes()).sum();
        riding + self.transfer_minutes()
    }

    /// Days from the first departure to the final arrival.
    pub fn arrival_day_offset(&self) -> u32 {
        (self.departure().minute_of_day() + self.total_duration_minutes())
            / super::MINUTES_PER_DAY
    }

    /// Total fare across all legs in the given class.
    pub fn price(&self, class: TravelClass) -> Fare {
        self.legs.iter().map(|l| l.fare(class)).sum()
    }
}

impl PartialEq for Itinerary {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for Itinerary {}

impl Hash for Itinerary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn leg(id: &str, from: &str, to: &str, dep: &str, arr: &str, second: u64) -> Arc<Leg> {
        Arc::new(
            Leg::new(
                LegId::parse(id).unwrap(),
                Location::parse(from).unwrap(),
                Location::parse(to).unwrap(),
                time(dep),
                time(arr),
                None,
            )
            .unwrap()
            .with_fares(Fare::from_cents(second * 2), Fare::from_cents(second)),
        )
    }

    #[test]
    fn direct_itinerary() {
        let it = Itinerary::direct(leg("A1", "Paris", "Lyon", "08:00", "10:00", 5000));
        assert_eq!(it.leg_count(), 1);
        assert_eq!(it.transfer_count(), 0);
        assert_eq!(it.total_duration_minutes(), 120);
        assert_eq!(it.transfer_minutes(), 0);
        assert_eq!(it.signature().to_string(), "A1");
    }

    #[test]
    fn one_transfer_totals() {
        let it = Itinerary::new(vec![
            leg("A1", "Paris", "Lyon", "08:00", "10:00", 5000),
            leg("B1", "Lyon", "Nice", "10:30", "14:00", 3000),
        ])
        .unwrap();

        assert_eq!(it.transfer_count(), 1);
        assert_eq!(it.transfer_minutes(), 30);
        assert_eq!(it.total_duration_minutes(), 120 + 30 + 210);
        assert_eq!(it.price(TravelClass::Second).cents(), 8000);
        assert_eq!(it.price(TravelClass::First).cents(), 16000);
        assert_eq!(it.signature().to_string(), "A1>B1");
        assert_eq!(it.origin().as_str(), "Paris");
        assert_eq!(it.destination().as_str(), "Nice");
    }

    #[test]
    fn transfer_across_midnight() {
        let it = Itinerary::new(vec![
            leg("A1", "Paris", "Lyon", "21:00", "23:50", 0),
            leg("B1", "Lyon", "Nice", "00:10", "04:00", 0),
        ])
        .unwrap();

        let transfer = it.transfers().next().unwrap();
        assert_eq!(transfer.gap_minutes, 20);
        assert_eq!(transfer.at.as_str(), "Lyon");
        assert_eq!(it.total_duration_minutes(), 170 + 20 + 230);
        assert_eq!(it.arrival_day_offset(), 1);
    }

    #[test]
    fn rejects_disconnected() {
        let result = Itinerary::new(vec![
            leg("A1", "Paris", "Lyon", "08:00", "10:00", 0),
            leg("B1", "Dijon", "Nice", "10:30", "14:00", 0),
        ]);
        assert!(matches!(result, Err(DomainError::LegsNotConnected(_, _))));
    }

    #[test]
    fn rejects_empty_and_too_long() {
        assert!(matches!(
            Itinerary::new(vec![]),
            Err(DomainError::EmptyItinerary)
        ));

        let legs = vec![
            leg("A", "P", "Q", "08:00", "09:00", 0),
            leg("B", "Q", "R", "09:30", "10:00", 0),
            leg("C", "R", "S", "10:30", "11:00", 0),
            leg("D", "S", "T", "11:30", "12:00", 0),
        ];
        assert!(matches!(
            Itinerary::new(legs),
            Err(DomainError::TooManyLegs(4))
        ));
    }

    #[test]
    fn equality_by_signature() {
        let a = Itinerary::direct(leg("A1", "Paris", "Lyon", "08:00", "10:00", 5000));
        let b = Itinerary::direct(leg("A1", "Paris", "Lyon", "08:00", "10:00", 5000));
        let c = Itinerary::direct(leg("A2", "Paris", "Lyon", "08:00", "10:00", 5000));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn signature_parse() {
        let sig: ItinerarySignature = "X>Y>Z".parse().unwrap();
        assert_eq!(sig.leg_ids().len(), 3);
        assert!("X>>Z".parse::<ItinerarySignature>().is_err());
        assert!("".parse::<ItinerarySignature>().is_err());
    }
}
