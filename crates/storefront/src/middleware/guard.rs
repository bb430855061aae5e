//! Session loading, the route guard, and session extractors.
//!
//! [`load_session_store`] runs on every request and turns the raw
//! tower-sessions record into a [`SessionStore`] in the request extensions.
//! [`require_session`] is installed with `route_layer` on the protected
//! router, so the access decision is made before any protected handler runs.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use freshcart_core::{GuardDecision, Route, guard};

use crate::error::AppError;
use crate::htmx::{self, HxRequest};
use crate::models::SessionToken;
use crate::store::SessionStore;

/// Build the visitor's [`SessionStore`] from the loaded session record.
pub async fn load_session_store(mut request: Request, next: Next) -> Response {
    let Some(session) = request.extensions().get::<Session>().cloned() else {
        tracing::error!("Session layer missing; SessionManagerLayer must wrap this middleware");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    match SessionStore::initialize(session).await {
        Ok(store) => {
            request.extensions_mut().insert(store);
            next.run(request).await
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Route guard: redirect to sign-in unless the visitor holds a token.
///
/// Reads the live [`SessionStore`] on every request; nothing is cached.
pub async fn require_session(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path(), |uri| uri.0.path());
    let route = Route::from_path(path);

    let signed_in = request
        .extensions()
        .get::<SessionStore>()
        .is_some_and(SessionStore::is_authenticated);

    match guard(&route, signed_in) {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::RedirectToSignIn => {
            tracing::debug!(route = %route, "Redirecting unauthenticated visitor to sign-in");
            let hx = HxRequest(htmx::is_htmx(request.headers().get("HX-Request")));
            htmx::redirect(hx, Route::SIGN_IN_PATH)
        }
    }
}

/// Extractor for the visitor's session, signed in or not.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> impl IntoResponse {
///     if session.is_authenticated() { "Welcome back" } else { "Hello" }
/// }
/// ```
pub struct CurrentSession(pub SessionStore);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionStore>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Internal("session store not loaded".to_string()))
    }
}

/// Extractor that requires a signed-in visitor.
///
/// Protected routes are already behind [`require_session`]; this extractor
/// hands the handler the token snapshot it should use for remote calls.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, auth: Authenticated) -> Result<Response> {
///     let cart = state.cart(auth.token).list().await?;
///     // ...
/// }
/// ```
pub struct Authenticated {
    pub session: SessionStore,
    pub token: SessionToken,
}

/// Rejection when a handler needs a token and the visitor has none.
pub struct AuthRejection {
    hx: HxRequest,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        htmx::redirect(self.hx, Route::SIGN_IN_PATH)
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let hx = HxRequest(htmx::is_htmx(parts.headers.get("HX-Request")));
        let session = parts
            .extensions
            .get::<SessionStore>()
            .cloned()
            .ok_or(AuthRejection { hx })?;
        let token = session.token().ok_or(AuthRejection { hx })?;

        Ok(Self { session, token })
    }
}
