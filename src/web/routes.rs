use std::sync::Arc;

use axum::extract::{Path, Query as UrlQuery, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{WebResult, created, ok};
use crate::core::{EntityId, ObjectRef};
use crate::model::{
    CreateActivity, CreateComment, CreateDestination, CreatePlanner, CreateTransport, CreateUser,
    UpdateActivity, UpdateDestination, UpdatePlanner, UpdateTransport, UpdateUser, VoteDirection,
};
use crate::service::TripPlanDb;
use crate::storage::MemoryStore;

pub struct AppState {
    pub db: TripPlanDb<MemoryStore>,
}

impl AppState {
    pub fn new(db: TripPlanDb<MemoryStore>) -> Arc<Self> {
        Arc::new(Self { db })
    }
}

/// The caller-supplied actor, standing in for verified auth.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorQuery {
    user_id: String,
}

/// A polymorphic attachment target on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectQuery {
    #[serde(rename = "type")]
    kind: String,
    object_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentCreatePayload {
    #[serde(rename = "type")]
    kind: String,
    object_id: String,
    #[serde(flatten)]
    input: CreateComment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentDeletePayload {
    #[serde(rename = "type")]
    kind: String,
    object_id: String,
    comment_id: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CastVotePayload {
    #[serde(rename = "type")]
    kind: String,
    object_id: String,
    user_id: String,
    direction: VoteDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetractVotePayload {
    #[serde(rename = "type")]
    kind: String,
    object_id: String,
    user_id: String,
}

fn entity_id(value: &str) -> WebResult<EntityId> {
    Ok(EntityId::parse(value)?)
}

fn object_ref(kind: &str, id: &str) -> WebResult<ObjectRef> {
    Ok(ObjectRef::parse(kind, id)?)
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/user/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/planner", post(create_planner))
        .route(
            "/planner/:id",
            get(get_planner).patch(update_planner).delete(delete_planner),
        )
        .route("/planner/:id/invite/accept", post(accept_invite))
        .route("/planner/:id/destination", post(create_destination))
        .route(
            "/planner/:id/destination/:destination_id",
            get(get_destination)
                .patch(update_destination)
                .delete(delete_destination),
        )
        .route(
            "/planner/:id/destination/:destination_id/activity",
            post(create_activity),
        )
        .route(
            "/planner/:id/destination/:destination_id/activity/:activity_id",
            get(get_activity).patch(update_activity).delete(delete_activity),
        )
        .route("/planner/:id/transportation", post(create_transport))
        .route(
            "/planner/:id/transportation/:transport_id",
            get(get_transport)
                .patch(update_transport)
                .delete(delete_transport),
        )
        .route(
            "/comment",
            get(get_comments).post(create_comment).delete(delete_comment),
        )
        .route("/comment/:id", get(get_comment))
        .route("/vote", get(get_votes).post(cast_vote).delete(retract_vote))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────
// USERS
// ─────────────────────────────────────────────

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateUser>,
) -> WebResult<impl IntoResponse> {
    Ok(created(state.db.create_user(input).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    Ok(ok(state.db.get_user(&id).await?))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateUser>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    Ok(ok(state.db.update_user(&id, patch).await?))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    Ok(ok(state.db.delete_user(&id).await?))
}

// ─────────────────────────────────────────────
// PLANNERS
// ─────────────────────────────────────────────

async fn create_planner(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreatePlanner>,
) -> WebResult<impl IntoResponse> {
    Ok(created(state.db.create_planner(input).await?))
}

async fn get_planner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state.db.get_planner(&actor, &id).await?))
}

async fn update_planner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
    Json(patch): Json<UpdatePlanner>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state.db.update_planner(&actor, &id, patch).await?))
}

async fn delete_planner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state.db.delete_planner(&actor, &id).await?))
}

async fn accept_invite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state.db.accept_invite(&actor, &id).await?))
}

// ─────────────────────────────────────────────
// DESTINATIONS
// ─────────────────────────────────────────────

async fn create_destination(
    State(state): State<Arc<AppState>>,
    Path(planner_id): Path<String>,
    Json(input): Json<CreateDestination>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let actor = input.created_by.clone();
    Ok(created(
        state
            .db
            .create_destination(&actor, &planner_id, input)
            .await?,
    ))
}

async fn get_destination(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .get_destination(&actor, &planner_id, &destination_id)
        .await?))
}

async fn update_destination(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
    Json(patch): Json<UpdateDestination>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .update_destination(&actor, &planner_id, &destination_id, patch)
        .await?))
}

async fn delete_destination(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .delete_destination(&actor, &planner_id, &destination_id)
        .await?))
}

// ─────────────────────────────────────────────
// ACTIVITIES
// ─────────────────────────────────────────────

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id)): Path<(String, String)>,
    Json(input): Json<CreateActivity>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let actor = input.created_by.clone();
    Ok(created(
        state
            .db
            .create_activity(&actor, &planner_id, &destination_id, input)
            .await?,
    ))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id, activity_id)): Path<(String, String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let activity_id = entity_id(&activity_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .get_activity(&actor, &planner_id, &destination_id, &activity_id)
        .await?))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id, activity_id)): Path<(String, String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
    Json(patch): Json<UpdateActivity>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let activity_id = entity_id(&activity_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .update_activity(&actor, &planner_id, &destination_id, &activity_id, patch)
        .await?))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path((planner_id, destination_id, activity_id)): Path<(String, String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let destination_id = entity_id(&destination_id)?;
    let activity_id = entity_id(&activity_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .delete_activity(&actor, &planner_id, &destination_id, &activity_id)
        .await?))
}

// ─────────────────────────────────────────────
// TRANSPORTATION
// ─────────────────────────────────────────────

async fn create_transport(
    State(state): State<Arc<AppState>>,
    Path(planner_id): Path<String>,
    Json(input): Json<CreateTransport>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let actor = input.created_by.clone();
    Ok(created(
        state.db.create_transport(&actor, &planner_id, input).await?,
    ))
}

async fn get_transport(
    State(state): State<Arc<AppState>>,
    Path((planner_id, transport_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let transport_id = entity_id(&transport_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .get_transport(&actor, &planner_id, &transport_id)
        .await?))
}

async fn update_transport(
    State(state): State<Arc<AppState>>,
    Path((planner_id, transport_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
    Json(patch): Json<UpdateTransport>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let transport_id = entity_id(&transport_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .update_transport(&actor, &planner_id, &transport_id, patch)
        .await?))
}

async fn delete_transport(
    State(state): State<Arc<AppState>>,
    Path((planner_id, transport_id)): Path<(String, String)>,
    UrlQuery(actor): UrlQuery<ActorQuery>,
) -> WebResult<impl IntoResponse> {
    let planner_id = entity_id(&planner_id)?;
    let transport_id = entity_id(&transport_id)?;
    let actor = entity_id(&actor.user_id)?;
    Ok(ok(state
        .db
        .delete_transport(&actor, &planner_id, &transport_id)
        .await?))
}

// ─────────────────────────────────────────────
// COMMENTS
// ─────────────────────────────────────────────

async fn get_comments(
    State(state): State<Arc<AppState>>,
    UrlQuery(object): UrlQuery<ObjectQuery>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&object.kind, &object.object_id)?;
    Ok(ok(state.db.get_comments(&object).await?))
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommentCreatePayload>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&payload.kind, &payload.object_id)?;
    Ok(created(state.db.add_comment(&object, payload.input).await?))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommentDeletePayload>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&payload.kind, &payload.object_id)?;
    let comment_id = entity_id(&payload.comment_id)?;
    let requester = entity_id(&payload.user_id)?;
    Ok(ok(state
        .db
        .remove_comment(&object, &comment_id, &requester)
        .await?))
}

async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let id = entity_id(&id)?;
    Ok(ok(state.db.get_comment(&id).await?))
}

// ─────────────────────────────────────────────
// VOTES
// ─────────────────────────────────────────────

async fn get_votes(
    State(state): State<Arc<AppState>>,
    UrlQuery(object): UrlQuery<ObjectQuery>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&object.kind, &object.object_id)?;
    Ok(ok(state.db.get_votes(&object).await?))
}

async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CastVotePayload>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&payload.kind, &payload.object_id)?;
    let user = entity_id(&payload.user_id)?;
    Ok(ok(state
        .db
        .cast_vote(&object, &user, payload.direction)
        .await?))
}

async fn retract_vote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RetractVotePayload>,
) -> WebResult<impl IntoResponse> {
    let object = object_ref(&payload.kind, &payload.object_id)?;
    let user = entity_id(&payload.user_id)?;
    Ok(ok(state.db.retract_vote(&object, &user).await?))
}
