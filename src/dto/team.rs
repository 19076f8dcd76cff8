//! DTO definitions for teams and registrations.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{dto::validation::validate_not_blank, state::competition::Team};

/// Payload used to create a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Query string of the registration endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegisterTeamQuery {
    /// Team to register.
    #[serde(alias = "teamId")]
    pub team_id: Uuid,
}

/// Public projection of a team.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct TeamSummary {
    /// Team identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl From<Team> for TeamSummary {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_query_accepts_both_spellings() {
        let id = Uuid::new_v4();
        let snake: RegisterTeamQuery =
            serde_json::from_value(serde_json::json!({ "team_id": id })).unwrap();
        let camel: RegisterTeamQuery =
            serde_json::from_value(serde_json::json!({ "teamId": id })).unwrap();
        assert_eq!(snake.team_id, id);
        assert_eq!(camel.team_id, id);
    }

    #[test]
    fn blank_team_name_is_rejected() {
        let request = CreateTeamRequest { name: " ".into() };
        assert!(request.validate().is_err());
    }
}
