//! DTO definitions for competition admission and listing.

use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        iso_date,
        validation::{validate_date_range, validate_not_blank},
    },
    state::competition::{Competition, NewCompetition},
};

/// Payload used to create a competition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct CreateCompetitionRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub sport: String,
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date, example = "2025-05-01")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date, example = "2025-05-07")]
    pub end_date: Date,
    #[validate(range(min = 1, message = "there must be at least one court"))]
    #[schema(minimum = 1)]
    pub number_of_courts: u32,
}

impl From<CreateCompetitionRequest> for NewCompetition {
    fn from(value: CreateCompetitionRequest) -> Self {
        Self {
            name: value.name,
            sport: value.sport,
            start_date: value.start_date,
            end_date: value.end_date,
            number_of_courts: value.number_of_courts,
        }
    }
}

/// Public projection of a competition.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CompetitionSummary {
    /// Competition identifier.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Sport played.
    pub sport: String,
    /// First day of play.
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date)]
    pub start_date: Date,
    /// Last day of play.
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date)]
    pub end_date: Date,
    /// Courts available each day.
    pub number_of_courts: u32,
}

impl From<Competition> for CompetitionSummary {
    fn from(value: Competition) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport: value.sport,
            start_date: value.start_date,
            end_date: value.end_date,
            number_of_courts: value.number_of_courts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> CreateCompetitionRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn accepts_well_formed_request() {
        let request = parse(
            r#"{"name":"Spring Cup","sport":"Tennis","start_date":"2025-05-01","end_date":"2025-05-07","number_of_courts":2}"#,
        );
        assert!(request.validate().is_ok());
        assert_eq!(request.start_date.to_string(), "2025-05-01");
    }

    #[test]
    fn rejects_zero_courts_and_blank_name() {
        let request = parse(
            r#"{"name":"  ","sport":"Tennis","start_date":"2025-05-01","end_date":"2025-05-07","number_of_courts":0}"#,
        );
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("number_of_courts"));
        assert!(!fields.contains_key("sport"));
    }

    #[test]
    fn rejects_inverted_dates() {
        let request = parse(
            r#"{"name":"Cup","sport":"Tennis","start_date":"2025-05-07","end_date":"2025-05-01","number_of_courts":1}"#,
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = serde_json::from_str::<CreateCompetitionRequest>(
            r#"{"name":"Cup","sport":"Tennis","start_date":"01/05/2025","end_date":"2025-05-07","number_of_courts":1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn summary_serializes_dates_as_calendar_days() {
        let request = parse(
            r#"{"name":"Cup","sport":"Padel","start_date":"2025-06-10","end_date":"2025-06-12","number_of_courts":3}"#,
        );
        let competition = NewCompetition::from(request).admit().unwrap();
        let json = serde_json::to_value(CompetitionSummary::from(competition)).unwrap();
        assert_eq!(json["start_date"], "2025-06-10");
        assert_eq!(json["end_date"], "2025-06-12");
        assert_eq!(json["number_of_courts"], 3);
    }
}
