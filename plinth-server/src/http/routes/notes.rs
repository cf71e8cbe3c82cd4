//! Note endpoints - a small resource wired entirely through the base
//! layer: lenient extractors in, envelope out, generic model in between.
//! Notes are scoped to the authenticated user.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use plinth_core::{Envelope, Filter, Page, PageParams, Record};

use crate::db::{Model, Table};
use crate::http::auth::AuthUser;
use crate::http::extractors::LenientJson;
use crate::http::respond;
use crate::http::server::AppState;

/// Note row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Table binding for notes.
pub struct Notes;

impl Table for Notes {
    const NAME: &'static str = "notes";
    type Row = Note;
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
}

fn model(state: &AppState) -> Model<Notes> {
    Model::new(state.pool.clone())
}

fn row_json(note: &Note) -> Value {
    serde_json::to_value(note).unwrap_or(Value::Null)
}

/// POST /notes - create a note owned by the current user
async fn create_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    LenientJson(params): LenientJson,
) -> Response {
    let record = match Record::from_json(&Value::Object(params)) {
        // the author column always comes from the credential, not the body
        Ok(record) => record.set("author", user.id.as_str()),
        Err(err) => return respond::json(Envelope::fail(400, err.to_string())),
    };

    match model(&state).add_data(record).await {
        Some(note) => respond::json(Envelope::ok(row_json(&note))),
        None => respond::json(Envelope::fail(500, "could not create note")),
    }
}

/// GET /notes - the current user's notes, newest first
async fn list_notes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> Response {
    let filters = [Filter::eq("author", user.id.as_str())];

    match model(&state).query_data(&filters, Page::from(params)).await {
        Some(page) => {
            let data = serde_json::to_value(&page).unwrap_or(Value::Null);
            respond::json(Envelope::ok(data))
        }
        None => respond::json(Envelope::fail(500, "could not list notes")),
    }
}

/// GET /notes/{id}
async fn get_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    let filters = [Filter::eq("id", id), Filter::eq("author", user.id.as_str())];

    match model(&state).query_one_data(&filters).await {
        Some(note) => respond::json(Envelope::ok(row_json(&note))),
        None => respond::json(Envelope::fail(404, format!("note '{}' not found", id))),
    }
}

/// PATCH /notes/{id}
async fn update_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    LenientJson(params): LenientJson,
) -> Response {
    let record = match Record::from_json(&Value::Object(params)) {
        Ok(record) => record,
        Err(err) => return respond::json(Envelope::fail(400, err.to_string())),
    };
    if record.is_empty() {
        return respond::json(Envelope::fail(400, "no fields to update"));
    }

    let filters = [Filter::eq("id", id), Filter::eq("author", user.id.as_str())];
    match model(&state).update_data(&filters, record).await {
        Some(count) => respond::json(Envelope::ok(serde_json::json!({ "updated": count }))),
        None => respond::json(Envelope::fail(500, "could not update note")),
    }
}

/// DELETE /notes/{id}
async fn delete_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    let filters = [Filter::eq("id", id), Filter::eq("author", user.id.as_str())];

    match model(&state).delete_data(&filters).await {
        Some(count) => respond::json(Envelope::ok(serde_json::json!({ "deleted": count }))),
        None => respond::json(Envelope::fail(500, "could not delete note")),
    }
}

#[cfg(test)]
mod tests {
    // End-to-end route tests need a live database; the layer underneath
    // (model SQL, envelope, extractors, auth) is covered by unit tests in
    // its own modules.
    // Run with: DATABASE_URL=... cargo test -p plinth-server -- --ignored
}
