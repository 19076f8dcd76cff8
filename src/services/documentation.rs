use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the competition scheduler.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::competitions::create_competition,
        crate::routes::competitions::list_competitions,
        crate::routes::competitions::get_competition,
        crate::routes::competitions::delete_competition,
        crate::routes::competitions::list_competition_teams,
        crate::routes::competitions::register_team,
        crate::routes::competitions::generate_first_round,
        crate::routes::competitions::list_matches,
        crate::routes::competitions::unassigned_teams,
        crate::routes::teams::create_team,
        crate::routes::teams::list_teams,
        crate::routes::teams::get_team,
        crate::routes::teams::list_team_competitions,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::competition::CreateCompetitionRequest,
            crate::dto::competition::CompetitionSummary,
            crate::dto::team::CreateTeamRequest,
            crate::dto::team::TeamSummary,
            crate::dto::matches::MatchSummary,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "competitions", description = "Competitions, registrations and first-round scheduling"),
        (name = "teams", description = "Team registry"),
    )
)]
pub struct ApiDoc;
