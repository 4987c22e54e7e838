use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};
use chrono_tz::Tz;
use delivery::Dispatcher;
use uuid::Uuid;

use std::{sync::Arc, time::Duration};

use crate::{
    session,
    sessions::{DEFAULT_IDLE_TTL, SessionStore},
    tally,
};
use engine::Engine;

static SESSION_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static(api_types::SESSION_HEADER);

#[derive(Clone)]
pub struct ServerState {
    pub(crate) engine: Arc<Engine>,
    pub(crate) sessions: SessionStore,
    pub(crate) dispatcher: Option<Arc<Dispatcher>>,
    pub(crate) timezone: Tz,
}

impl ServerState {
    /// Without a dispatcher, closing a session only ends it.
    pub fn new(engine: Engine, dispatcher: Option<Dispatcher>, timezone: Tz) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions: SessionStore::new(DEFAULT_IDLE_TTL),
            dispatcher: dispatcher.map(Arc::new),
            timezone,
        }
    }

    /// Drop sessions that see no request for `idle_ttl`.
    pub fn session_ttl(mut self, idle_ttl: Duration) -> Self {
        self.sessions = SessionStore::new(idle_ttl);
        self
    }
}

/// `TypedHeader` for the session id
///
/// Every request but login must carry the "tally-session-id" header.
#[derive(Debug)]
struct SessionHeader(Uuid);

impl Header for SessionHeader {
    fn name() -> &'static axum::http::HeaderName {
        &SESSION_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(SessionHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode tally-session-id header"),
        }
    }
}

async fn require_session(
    session_header: Result<TypedHeader<SessionHeader>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Ok(TypedHeader(SessionHeader(id))) = session_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let session = state.sessions.get(id).await.ok_or(StatusCode::NOT_FOUND)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let in_session = Router::new()
        .route("/session", get(session::view).delete(session::end))
        .route("/session/adjust", post(tally::adjust))
        .route("/session/categories", post(tally::register_category))
        .route("/session/commit", post(tally::commit))
        .route("/session/close", post(session::close))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/session", post(session::start))
        .merge(in_session)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use engine::Tally;
    use tower::ServiceExt;

    use super::*;

    async fn state() -> ServerState {
        // Nothing here reaches the database.
        let engine = Engine::builder().build().await.unwrap();
        ServerState::new(engine, None, chrono_tz::UTC).session_ttl(Duration::from_secs(600))
    }

    async fn view_status(state: &ServerState, id: Uuid) -> StatusCode {
        let req = axum::http::Request::builder()
            .method("GET")
            .uri("/session")
            .header(api_types::SESSION_HEADER, id.to_string())
            .body(Body::empty())
            .unwrap();
        router(state.clone()).oneshot(req).await.unwrap().status()
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_is_gone() {
        let state = state().await;
        let id = state
            .sessions
            .insert(Tally::start("ana", "north").unwrap())
            .await;

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(view_status(&state, id).await, StatusCode::OK);

        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(view_status(&state, id).await, StatusCode::NOT_FOUND);
    }
}
