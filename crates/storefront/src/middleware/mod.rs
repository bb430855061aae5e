//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, `PostgreSQL` store)
//! 5. Session store loader (builds the visitor's `SessionStore`)
//! 6. Route guard (`route_layer` on protected routes only)

pub mod guard;
pub mod request_id;
pub mod session;

pub use guard::{Authenticated, CurrentSession, load_session_store, require_session};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::create_session_layer;
