//! Counting endpoints: adjust, register category and save.

use api_types::{
    ActionResult,
    tally::{Adjust, Adjusted, CategoryNew, Committed, Direction},
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState, sessions::ActiveSession};

pub(crate) async fn adjust(
    Extension(session): Extension<ActiveSession>,
    Json(payload): Json<Adjust>,
) -> Result<Json<Adjusted>, ServerError> {
    let direction = match payload.direction {
        Direction::Increase => engine::Direction::Increase,
        Direction::Decrease => engine::Direction::Decrease,
    };

    let mut tally = session.tally.lock().await;
    let count = tally.adjust(&payload.category, direction)?;

    Ok(Json(Adjusted {
        ok: true,
        count,
        running_total: tally.running_total(),
    }))
}

pub(crate) async fn register_category(
    Extension(session): Extension<ActiveSession>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<ActionResult>, ServerError> {
    let mut tally = session.tally.lock().await;
    let category = tally.register_category(&payload.name)?;

    Ok(Json(ActionResult::ok_with(format!(
        "Categoría {} agregada.",
        category.name
    ))))
}

/// Save the tally into its ledger, stamped with the configured local time.
pub(crate) async fn commit(
    Extension(session): Extension<ActiveSession>,
    State(state): State<ServerState>,
) -> Result<Json<Committed>, ServerError> {
    let at = Utc::now().with_timezone(&state.timezone).naive_local();

    let mut tally = session.tally.lock().await;
    let receipt = state.engine.commit(&mut tally, at).await?;

    let message = if receipt.entries == 0 {
        "No hay cambios para guardar."
    } else {
        "Datos guardados correctamente."
    };

    Ok(Json(Committed {
        ok: true,
        message: message.to_string(),
        ledger_key: receipt.key.to_string(),
        entries: receipt.entries,
        total: receipt.total,
    }))
}
