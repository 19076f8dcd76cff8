use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        competition::{CompetitionSummary, CreateCompetitionRequest},
        matches::MatchSummary,
        team::{RegisterTeamQuery, TeamSummary},
    },
    error::{AppError, ErrorBody},
    routes::extract::{ApiPath, ApiQuery, ValidJson},
    services::{competition_service, match_service, roster_service},
    state::SharedState,
};

/// Competition management, registration and scheduling endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/competitions",
            get(list_competitions).post(create_competition),
        )
        .route(
            "/competitions/{id}",
            get(get_competition).delete(delete_competition),
        )
        .route(
            "/competitions/{id}/teams",
            get(list_competition_teams).post(register_team),
        )
        .route("/competitions/{id}/matches", get(list_matches))
        .route(
            "/competitions/{id}/matches/first-round",
            post(generate_first_round),
        )
        .route(
            "/competitions/{id}/matches/unassigned-teams",
            get(unassigned_teams),
        )
}

/// Create a competition with a unique name.
#[utoipa::path(
    post,
    path = "/api/competitions",
    tag = "competitions",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionSummary),
        (status = 400, description = "Invalid competition", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn create_competition(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<CreateCompetitionRequest>,
) -> Result<(StatusCode, Json<CompetitionSummary>), AppError> {
    let summary = competition_service::create_competition(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// List every competition.
#[utoipa::path(
    get,
    path = "/api/competitions",
    tag = "competitions",
    responses((status = 200, description = "Known competitions", body = [CompetitionSummary]))
)]
pub async fn list_competitions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CompetitionSummary>>, AppError> {
    Ok(Json(competition_service::list_competitions(&state).await?))
}

/// Retrieve a competition by its identifier.
#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 200, description = "Competition", body = CompetitionSummary),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn get_competition(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CompetitionSummary>, AppError> {
    Ok(Json(competition_service::get_competition(&state, id).await?))
}

/// Delete a competition with its registrations and matches.
#[utoipa::path(
    delete,
    path = "/api/competitions/{id}",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn delete_competition(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    competition_service::delete_competition(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the teams registered to a competition.
#[utoipa::path(
    get,
    path = "/api/competitions/{id}/teams",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 200, description = "Registered teams", body = [TeamSummary]),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn list_competition_teams(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<TeamSummary>>, AppError> {
    Ok(Json(
        competition_service::list_competition_teams(&state, id).await?,
    ))
}

/// Register an existing team to the competition.
#[utoipa::path(
    post,
    path = "/api/competitions/{id}/teams",
    tag = "competitions",
    params(
        ("id" = Uuid, Path, description = "Competition identifier"),
        RegisterTeamQuery
    ),
    responses(
        (status = 201, description = "Team registered", body = TeamSummary),
        (status = 404, description = "Unknown team or competition", body = ErrorBody),
        (status = 409, description = "Team already registered", body = ErrorBody)
    )
)]
pub async fn register_team(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<RegisterTeamQuery>,
) -> Result<(StatusCode, Json<TeamSummary>), AppError> {
    let team = roster_service::register_team(&state, id, query.team_id).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Pair the registered teams into the first round and record the matches.
#[utoipa::path(
    post,
    path = "/api/competitions/{id}/matches/first-round",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 201, description = "Generated matches", body = [MatchSummary]),
        (status = 400, description = "Fewer than two registered teams", body = ErrorBody),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn generate_first_round(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<Vec<MatchSummary>>), AppError> {
    let matches = match_service::generate_first_round(&state, id).await?;
    Ok((StatusCode::CREATED, Json(matches)))
}

/// List every match recorded for the competition.
#[utoipa::path(
    get,
    path = "/api/competitions/{id}/matches",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 200, description = "Recorded matches", body = [MatchSummary]),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(match_service::list_matches(&state, id).await?))
}

/// List the registered teams that play in no recorded match.
#[utoipa::path(
    get,
    path = "/api/competitions/{id}/matches/unassigned-teams",
    tag = "competitions",
    params(("id" = Uuid, Path, description = "Competition identifier")),
    responses(
        (status = 200, description = "Unassigned teams", body = [TeamSummary]),
        (status = 404, description = "Unknown competition", body = ErrorBody)
    )
)]
pub async fn unassigned_teams(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<TeamSummary>>, AppError> {
    Ok(Json(roster_service::unassigned_teams(&state, id).await?))
}
