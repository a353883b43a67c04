//! Fixed option vocabularies offered by the travel form

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PlannerError;

/// Amenities the traveller can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Amenity {
    Pool,
    Gym,
    FreeWifi,
    Parking,
    Restaurant,
    Spa,
}

impl Amenity {
    /// All amenities in the order the form lists them
    pub const ALL: [Amenity; 6] = [
        Amenity::Pool,
        Amenity::Gym,
        Amenity::FreeWifi,
        Amenity::Parking,
        Amenity::Restaurant,
        Amenity::Spa,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Amenity::Pool => "Pool",
            Amenity::Gym => "Gym",
            Amenity::FreeWifi => "Free WiFi",
            Amenity::Parking => "Parking",
            Amenity::Restaurant => "Restaurant",
            Amenity::Spa => "Spa",
        }
    }
}

impl Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Amenity {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.label() == s.trim())
            .ok_or_else(|| {
                PlannerError::validation(format!(
                    "Unknown amenity '{s}'. Must be one of: {}",
                    join_labels(Amenity::ALL.iter().map(|a| a.label()))
                ))
            })
    }
}

impl TryFrom<String> for Amenity {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amenity> for String {
    fn from(value: Amenity) -> Self {
        value.label().to_string()
    }
}

/// Kind of accommodation; exactly one is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StayType {
    #[default]
    Hotel,
    Airbnb,
    Hostel,
    Guesthouse,
}

impl StayType {
    pub const ALL: [StayType; 4] = [
        StayType::Hotel,
        StayType::Airbnb,
        StayType::Hostel,
        StayType::Guesthouse,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StayType::Hotel => "Hotel",
            StayType::Airbnb => "Airbnb",
            StayType::Hostel => "Hostel",
            StayType::Guesthouse => "Guesthouse",
        }
    }
}

impl Display for StayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StayType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StayType::ALL
            .into_iter()
            .find(|stay_type| stay_type.label() == s.trim())
            .ok_or_else(|| {
                PlannerError::validation(format!(
                    "Unknown stay type '{s}'. Must be one of: {}",
                    join_labels(StayType::ALL.iter().map(|t| t.label()))
                ))
            })
    }
}

impl TryFrom<String> for StayType {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StayType> for String {
    fn from(value: StayType) -> Self {
        value.label().to_string()
    }
}

/// Number of days for the itinerary, always within [`TripLength::MIN`, `TripLength::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TripLength(u8);

impl TripLength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 14;
    pub const DEFAULT: u8 = 2;

    pub fn new(days: i64) -> Result<Self, PlannerError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&days) {
            // range checked above
            Ok(Self(days as u8))
        } else {
            Err(PlannerError::validation(format!(
                "Trip length must be between {} and {} days, got: {days}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    #[must_use]
    pub fn days(self) -> u8 {
        self.0
    }
}

impl Default for TripLength {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i64> for TripLength {
    type Error = PlannerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TripLength> for u8 {
    fn from(value: TripLength) -> Self {
        value.0
    }
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Pool", Amenity::Pool)]
    #[case("Free WiFi", Amenity::FreeWifi)]
    #[case(" Spa ", Amenity::Spa)]
    fn test_amenity_from_label(#[case] label: &str, #[case] expected: Amenity) {
        assert_eq!(label.parse::<Amenity>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_amenity_is_rejected() {
        let err = "Sauna".parse::<Amenity>().unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
        assert!(err.to_string().contains("Sauna"));
    }

    #[test]
    fn test_amenity_serializes_as_label() {
        let json = serde_json::to_string(&vec![Amenity::FreeWifi, Amenity::Gym]).unwrap();
        assert_eq!(json, r#"["Free WiFi","Gym"]"#);
    }

    #[test]
    fn test_stay_type_defaults_to_hotel() {
        assert_eq!(StayType::default(), StayType::Hotel);
        assert_eq!("Guesthouse".parse::<StayType>().unwrap(), StayType::Guesthouse);
        assert!("Castle".parse::<StayType>().is_err());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(2, true)]
    #[case(14, true)]
    #[case(15, false)]
    #[case(-3, false)]
    fn test_trip_length_bounds(#[case] days: i64, #[case] accepted: bool) {
        assert_eq!(TripLength::new(days).is_ok(), accepted);
    }

    #[test]
    fn test_trip_length_default() {
        assert_eq!(TripLength::default().days(), 2);
    }

    #[test]
    fn test_trip_length_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<TripLength>("15").is_err());
        let days: TripLength = serde_json::from_str("5").unwrap();
        assert_eq!(days.days(), 5);
    }
}
