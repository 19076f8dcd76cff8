use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use uuid::Uuid;

use crate::{
    dto::{
        competition::CompetitionSummary,
        team::{CreateTeamRequest, TeamSummary},
    },
    error::{AppError, ErrorBody},
    routes::extract::{ApiPath, ValidJson},
    services::team_service,
    state::SharedState,
};

/// Team registry endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/{id}", get(get_team))
        .route("/teams/{id}/competitions", get(list_team_competitions))
}

/// Create a team.
#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamSummary),
        (status = 400, description = "Blank name", body = ErrorBody)
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamSummary>), AppError> {
    let team = team_service::create_team(&state, payload.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "teams",
    responses((status = 200, description = "Known teams", body = [TeamSummary]))
)]
pub async fn list_teams(State(state): State<SharedState>) -> Result<Json<Vec<TeamSummary>>, AppError> {
    Ok(Json(team_service::list_teams(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team", body = TeamSummary),
        (status = 404, description = "Unknown team", body = ErrorBody)
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TeamSummary>, AppError> {
    Ok(Json(team_service::get_team(&state, id).await?))
}

/// List the competitions a team is registered to.
#[utoipa::path(
    get,
    path = "/api/teams/{id}/competitions",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Competitions of the team", body = [CompetitionSummary]),
        (status = 404, description = "Unknown team", body = ErrorBody)
    )
)]
pub async fn list_team_competitions(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<CompetitionSummary>>, AppError> {
    Ok(Json(team_service::list_team_competitions(&state, id).await?))
}
