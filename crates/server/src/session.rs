//! Session lifecycle endpoints: login, view, end and close.

use api_types::{
    ActionResult,
    session::{CategoryCountView, CategoryOrigin, SessionStart, SessionStarted, TallyView},
};
use axum::{Extension, Json, extract::State};
use engine::Tally;

use crate::{ServerError, server::ServerState, sessions::ActiveSession};

pub(crate) fn map_view(tally: &Tally) -> TallyView {
    let view = tally.view();
    TallyView {
        operator: view.operator,
        route: view.route,
        ledger_key: tally.ledger_key().to_string(),
        categories: view
            .categories
            .into_iter()
            .map(|category| CategoryCountView {
                name: category.name,
                origin: match category.origin {
                    engine::CategoryOrigin::Base => CategoryOrigin::Base,
                    engine::CategoryOrigin::AdHoc => CategoryOrigin::AdHoc,
                },
                count: category.count,
            })
            .collect(),
        running_total: view.running_total,
        dirty: view.dirty,
    }
}

/// Handle login: make sure the ledger exists and start a fresh tally
///
/// The tally carries the names this login used, which may differ from the
/// ones the ledger was created with when both map to the same key.
pub(crate) async fn start(
    State(state): State<ServerState>,
    Json(payload): Json<SessionStart>,
) -> Result<Json<SessionStarted>, ServerError> {
    let ledger = state
        .engine
        .open_or_create(&payload.operator, &payload.route)
        .await?;
    let tally = Tally::start(&payload.operator, &payload.route)?;
    let view = map_view(&tally);

    let session_id = state.sessions.insert(tally).await;
    tracing::info!("session {session_id} started on {}", ledger.key);

    Ok(Json(SessionStarted {
        session_id,
        tally: view,
    }))
}

pub(crate) async fn view(Extension(session): Extension<ActiveSession>) -> Json<TallyView> {
    let tally = session.tally.lock().await;
    Json(map_view(&tally))
}

/// End the session without saving.
pub(crate) async fn end(
    Extension(session): Extension<ActiveSession>,
    State(state): State<ServerState>,
) -> Json<ActionResult> {
    let tally = session.tally.lock().await;
    if tally.is_dirty() {
        tracing::warn!(
            "session {} ended with unsaved counts on {}",
            session.id,
            tally.ledger_key()
        );
    }
    state.sessions.remove(session.id).await;
    Json(ActionResult::ok())
}

/// Deliver the saved ledger, then end the session.
///
/// If delivery fails the session stays open so the operator can retry.
pub(crate) async fn close(
    Extension(session): Extension<ActiveSession>,
    State(state): State<ServerState>,
) -> Result<Json<ActionResult>, ServerError> {
    let tally = session.tally.lock().await;
    let key = tally.ledger_key();

    let message = match &state.dispatcher {
        Some(dispatcher) => {
            let snapshot = state.engine.finalize(&key).await?;
            dispatcher.deliver(&snapshot).await?;
            format!("Registro enviado por {}.", dispatcher.sink_kind())
        }
        None => {
            tracing::warn!("no delivery sink configured, {key} was not sent");
            "Sesión cerrada sin envío.".to_string()
        }
    };

    if tally.is_dirty() {
        tracing::warn!("session {} closed with unsaved counts on {key}", session.id);
    }
    state.sessions.remove(session.id).await;
    tracing::info!("session {} closed", session.id);

    Ok(Json(ActionResult::ok_with(message)))
}
