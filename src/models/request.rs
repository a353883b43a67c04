//! Requests handed to the agent engine and the text it hands back

use std::fmt::{self, Display};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::vocabulary::{Amenity, StayType, TripLength};

/// Named inputs passed to a crew kickoff
pub type EngineInputs = Map<String, Value>;

/// Everything the traveller entered on the form, captured at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRequest {
    /// Free-text travel query, e.g. "Ahmedabad to Los Angeles for 5 days"
    pub user_query: String,
    pub current_location: String,
    pub destination_location: String,
    /// Free-text description of the destination
    pub location_description: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub amenities: Vec<Amenity>,
    pub stay_type: StayType,
    /// Stay budget in whole USD
    pub stay_budget: u32,
}

impl TravelRequest {
    /// Inputs for the intent mapping and recommendation tasks
    #[must_use]
    pub fn engine_inputs(&self) -> EngineInputs {
        let mut inputs = EngineInputs::new();
        inputs.insert("user_query".to_string(), json!(self.user_query));
        self.write_trip_fields(&mut inputs);
        inputs
    }

    /// Every field except the query; shared by both phases
    fn write_trip_fields(&self, inputs: &mut EngineInputs) {
        inputs.insert("current_location".to_string(), json!(self.current_location));
        inputs.insert(
            "destination_location".to_string(),
            json!(self.destination_location),
        );
        inputs.insert(
            "location_description".to_string(),
            json!(self.location_description),
        );
        inputs.insert(
            "check_in_date".to_string(),
            json!(self.check_in_date.format("%Y-%m-%d").to_string()),
        );
        inputs.insert(
            "check_out_date".to_string(),
            json!(self.check_out_date.format("%Y-%m-%d").to_string()),
        );
        inputs.insert(
            "amenities".to_string(),
            Value::Array(
                self.amenities
                    .iter()
                    .map(|amenity| json!(amenity.label()))
                    .collect(),
            ),
        );
        inputs.insert("stay_type".to_string(), json!(self.stay_type.label()));
        inputs.insert("stay_budget".to_string(), json!(self.stay_budget));
    }
}

/// The stay the operator picked from the recommendations plus the trip length.
///
/// The stay name is free text and is not checked against the recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaySelection {
    pub stay: String,
    pub days: TripLength,
}

/// Input for the itinerary phase: the selection plus the original trip fields
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryRequest<'a> {
    pub selection: &'a StaySelection,
    pub trip: &'a TravelRequest,
}

impl ItineraryRequest<'_> {
    /// Inputs for the itinerary task; the original query is not forwarded
    #[must_use]
    pub fn engine_inputs(&self) -> EngineInputs {
        let mut inputs = EngineInputs::new();
        inputs.insert(
            "user_selected_stay".to_string(),
            json!(self.selection.stay),
        );
        inputs.insert("days".to_string(), json!(self.selection.days.days()));
        self.trip.write_trip_fields(&mut inputs);
        inputs
    }
}

/// Opaque text returned by the engine, displayed exactly as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineOutput(String);

impl EngineOutput {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EngineOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::la_trip;
    use super::*;

    #[test]
    fn test_travel_request_inputs_carry_all_nine_fields() {
        let inputs = la_trip().engine_inputs();

        assert_eq!(inputs.len(), 9);
        assert_eq!(inputs["user_query"], "Ahmedabad to Los Angeles for 5 days");
        assert_eq!(inputs["current_location"], "Ahmedabad");
        assert_eq!(inputs["destination_location"], "Los Angeles");
        assert_eq!(inputs["check_in_date"], "2024-10-01");
        assert_eq!(inputs["check_out_date"], "2024-10-06");
        assert_eq!(inputs["amenities"], json!(["Pool", "Gym"]));
        assert_eq!(inputs["stay_type"], "Hotel");
        assert_eq!(inputs["stay_budget"], 200);
    }

    #[test]
    fn test_itinerary_inputs_drop_query() {
        let trip = la_trip();
        let selection = StaySelection {
            stay: "Hotel A".to_string(),
            days: TripLength::new(5).unwrap(),
        };
        let inputs = ItineraryRequest {
            selection: &selection,
            trip: &trip,
        }
        .engine_inputs();

        assert_eq!(inputs.len(), 10);
        assert!(!inputs.contains_key("user_query"));
        assert_eq!(inputs["user_selected_stay"], "Hotel A");
        assert_eq!(inputs["days"], 5);
        assert_eq!(inputs["destination_location"], "Los Angeles");
        assert_eq!(inputs["stay_budget"], 200);
    }

    #[test]
    fn test_engine_output_is_verbatim() {
        let output = EngineOutput::new("## Hotel A\n* pool\n<b>raw</b>");
        assert_eq!(output.as_str(), "## Hotel A\n* pool\n<b>raw</b>");
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r###""## Hotel A\n* pool\n<b>raw</b>""###
        );
    }
}
