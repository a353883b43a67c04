//! Input form stage
//!
//! Raw form submissions as the frontend posts them, and their conversion into
//! typed requests. Vocabulary and range constraints are enforced here; the
//! query and stay gates belong to the session.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Amenity, StayType, TravelRequest, TripLength};
use crate::{PlannerError, Result};

/// The travel form as submitted with "Submit Query"
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TravelForm {
    pub user_query: String,
    pub current_location: String,
    pub destination_location: String,
    pub location_description: String,
    /// Date pickers start on today
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub amenities: Vec<String>,
    /// First option (Hotel) when absent
    pub stay_type: Option<String>,
    /// Whole USD; 0 when absent
    pub stay_budget: Option<i64>,
}

impl TravelForm {
    /// Builds the request exactly as entered; text fields are not trimmed
    pub fn into_request(self) -> Result<TravelRequest> {
        let today = Local::now().date_naive();

        let mut amenities = Vec::with_capacity(self.amenities.len());
        for label in &self.amenities {
            let amenity: Amenity = label.parse()?;
            if !amenities.contains(&amenity) {
                amenities.push(amenity);
            }
        }

        let stay_type = match self.stay_type.as_deref() {
            None | Some("") => StayType::default(),
            Some(label) => label.parse()?,
        };

        let stay_budget = match self.stay_budget {
            None => 0,
            Some(budget) => u32::try_from(budget).map_err(|_| {
                PlannerError::validation(format!(
                    "Stay budget must be between 0 and {} USD, got: {budget}",
                    u32::MAX
                ))
            })?,
        };

        Ok(TravelRequest {
            user_query: self.user_query,
            current_location: self.current_location,
            destination_location: self.destination_location,
            location_description: self.location_description,
            check_in_date: self.check_in_date.unwrap_or(today),
            check_out_date: self.check_out_date.unwrap_or(today),
            amenities,
            stay_type,
            stay_budget,
        })
    }
}

/// Stay selection submitted with "Get Itinerary"
#[derive(Debug, Clone, Deserialize)]
pub struct StayForm {
    #[serde(default)]
    pub selected_stay: String,
    /// Absent means the default of 2 days; an explicit null leaves it unset
    #[serde(default = "default_days")]
    pub days: Option<i64>,
}

fn default_days() -> Option<i64> {
    Some(i64::from(TripLength::DEFAULT))
}

impl StayForm {
    /// Range-checks the trip length; an unset value stays `None`
    pub fn trip_length(&self) -> Result<Option<TripLength>> {
        self.days.map(TripLength::new).transpose()
    }
}

/// Fixed choices for the form widgets
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub amenities: Vec<&'static str>,
    pub stay_types: Vec<&'static str>,
    pub default_stay_type: &'static str,
    pub min_days: u8,
    pub max_days: u8,
    pub default_days: u8,
    pub budget_step: u32,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            amenities: Amenity::ALL.iter().map(|a| a.label()).collect(),
            stay_types: StayType::ALL.iter().map(|t| t.label()).collect(),
            default_stay_type: StayType::default().label(),
            min_days: TripLength::MIN,
            max_days: TripLength::MAX,
            default_days: TripLength::DEFAULT,
            budget_step: 10,
        }
    }
}
