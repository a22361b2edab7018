//! Catalog leg type.
//!
//! A `Leg` is one scheduled direct connection between two locations. Legs
//! are loaded once from the catalog and shared behind `Arc` by every
//! itinerary and trip that uses them.

use std::hash::{Hash, Hasher};

use super::{
    ClockTime, DomainError, Fare, LegId, Location, MINUTES_PER_DAY, OperatingDays, TravelClass,
};

/// A scheduled direct connection.
///
/// # Invariants
///
/// - Origin and destination differ
/// - Duration is strictly positive
/// - `arrival_day_offset` is the explicit offset from the timetable, or 1
///   when the arrival clock time is not after the departure
#[derive(Debug, Clone)]
pub struct Leg {
    id: LegId,
    origin: Location,
    destination: Location,
    departure: ClockTime,
    arrival: ClockTime,
    arrival_day_offset: u8,
    carrier: String,
    operating_days: OperatingDays,
    first_class: Fare,
    second_class: Fare,
}

impl Leg {
    /// Construct a leg, validating its schedule.
    ///
    /// `explicit_offset` is the "(+Nd)" suffix from the arrival time, if the
    /// timetable gave one. Without it an arrival at or before the departure
    /// clock time is taken to be on the next day.
    ///
    /// The leg starts with no carrier, daily operation and zero fares; use
    /// the `with_*` methods to fill those in.
    ///
    /// # Errors
    ///
    /// Returns `Err` if origin equals destination or an explicit
    /// offset puts the arrival at or before the departure.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_booking::domain::{ClockTime, Leg, LegId, Location};
    ///
    /// let leg = Leg::new(
    ///     LegId::parse("N1").unwrap(),
    ///     Location::parse("Paris").unwrap(),
    ///     Location::parse("Nice").unwrap(),
    ///     ClockTime::parse_hhmm("22:00").unwrap(),
    ///     ClockTime::parse_hhmm("06:30").unwrap(),
    ///     None,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(leg.arrival_day_offset(), 1);
    /// assert_eq!(leg.duration_minutes(), 510);
    /// ```
    pub fn new(
        id: LegId,
        origin: Location,
        destination: Location,
        departure: ClockTime,
        arrival: ClockTime,
        explicit_offset: Option<u8>,
    ) -> Result<Self, DomainError> {
        if origin == destination {
            return Err(DomainError::InvalidLeg(
                "origin and destination must differ",
            ));
        }

        let arrival_day_offset =
            explicit_offset.unwrap_or(if arrival <= departure { 1 } else { 0 });

        let absolute_arrival =
            u32::from(arrival_day_offset) * MINUTES_PER_DAY + arrival.minute_of_day();
        if absolute_arrival <= departure.minute_of_day() {
            return Err(DomainError::InvalidLeg("arrival must be after departure"));
        }

        Ok(Self {
            id,
            origin,
            destination,
            departure,
            arrival,
            arrival_day_offset,
            carrier: String::new(),
            operating_days: OperatingDays::DAILY,
            first_class: Fare::ZERO,
            second_class: Fare::ZERO,
        })
    }

    /// Sets the carrier or train type.
    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = carrier.into();
        self
    }

    /// Sets the weekly operating pattern.
    pub fn with_operating_days(mut self, days: OperatingDays) -> Self {
        self.operating_days = days;
        self
    }

    /// Sets the first and second class fares.
    pub fn with_fares(mut self, first_class: Fare, second_class: Fare) -> Self {
        self.first_class = first_class;
        self.second_class = second_class;
        self
    }

    pub fn id(&self) -> &LegId {
        &self.id
    }

    pub fn origin(&self) -> &Location {
        &self.origin
    }

    pub fn destination(&self) -> &Location {
        &self.destination
    }

    pub fn departure(&self) -> ClockTime {
        self.departure
    }

    pub fn arrival(&self) -> ClockTime {
        self.arrival
    }

    /// Days between departure and arrival (0 for same-day arrival).
    pub fn arrival_day_offset(&self) -> u8 {
        self.arrival_day_offset
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn operating_days(&self) -> OperatingDays {
        self.operating_days
    }

    /// Returns the fare for the given class.
    pub fn fare(&self, class: TravelClass) -> Fare {
        match class {
            TravelClass::First => self.first_class,
            TravelClass::Second => self.second_class,
        }
    }

    /// Minutes from departure to arrival, including any day offset.
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.arrival_day_offset) * MINUTES_PER_DAY + self.arrival.minute_of_day()
            - self.departure.minute_of_day()
    }
}

impl PartialEq for Leg {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Leg {}

impl Hash for Leg {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn time(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn make_leg(dep: &str, arr: &str, offset: Option<u8>) -> Result<Leg, DomainError> {
        Leg::new(
            LegId::parse("T1").unwrap(),
            loc("Paris"),
            loc("Lyon"),
            time(dep),
            time(arr),
            offset,
        )
    }

    #[test]
    fn same_day_duration() {
        let leg = make_leg("08:00", "10:00", None).unwrap();
        assert_eq!(leg.duration_minutes(), 120);
        assert_eq!(leg.arrival_day_offset(), 0);
    }

    #[test]
    fn implicit_overnight() {
        let leg = make_leg("23:00", "01:30", None).unwrap();
        assert_eq!(leg.arrival_day_offset(), 1);
        assert_eq!(leg.duration_minutes(), 150);
    }

    #[test]
    fn explicit_offset_wins() {
        let leg = make_leg("08:00", "09:00", Some(1)).unwrap();
        assert_eq!(leg.duration_minutes(), 25 * 60);

        let leg = make_leg("22:00", "06:00", Some(2)).unwrap();
        assert_eq!(leg.duration_minutes(), 2 * 1440 - 16 * 60);
    }

    #[test]
    fn equal_times_mean_next_day() {
        let leg = make_leg("08:00", "08:00", None).unwrap();
        assert_eq!(leg.arrival_day_offset(), 1);
        assert_eq!(leg.duration_minutes(), 1440);
    }

    #[test]
    fn non_positive_duration_rejected() {
        let err = make_leg("08:00", "08:00", Some(0)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidLeg(_)));
        assert!(make_leg("08:00", "07:00", Some(0)).is_err());
    }

    #[test]
    fn same_endpoints_rejected() {
        let result = Leg::new(
            LegId::parse("T1").unwrap(),
            loc("Paris"),
            loc("PARIS"),
            time("08:00"),
            time("09:00"),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn fares_by_class() {
        let leg = make_leg("08:00", "10:00", None)
            .unwrap()
            .with_fares(Fare::from_cents(8000), Fare::from_cents(4500));
        assert_eq!(leg.fare(TravelClass::First).cents(), 8000);
        assert_eq!(leg.fare(TravelClass::Second).cents(), 4500);
    }

    #[test]
    fn identity_is_the_id() {
        use std::collections::HashSet;

        let morning = make_leg("08:00", "10:00", None).unwrap().with_carrier("TGV");
        let retimed = make_leg("09:00", "11:30", None).unwrap().with_carrier("TER");
        assert_eq!(morning, retimed);

        let mut set = HashSet::new();
        set.insert(morning);
        assert!(!set.insert(retimed));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn defaults_before_builders() {
        let leg = make_leg("08:00", "10:00", None).unwrap();
        assert_eq!(leg.carrier(), "");
        assert_eq!(leg.operating_days(), OperatingDays::DAILY);
        assert_eq!(leg.fare(TravelClass::First), Fare::ZERO);
    }
}
