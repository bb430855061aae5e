//! Shared harness for storefront integration tests.
//!
//! [`FakeApi`] is an axum server on an ephemeral port standing in for the
//! remote e-commerce API: replies are scripted per method and path, and every
//! call is recorded. [`TestApp`] runs the real storefront router against it
//! with an in-memory session store.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower_sessions::MemoryStore;

use freshcart_storefront::config::{EcommerceApiConfig, StorefrontConfig};
use freshcart_storefront::middleware::create_session_layer;
use freshcart_storefront::state::AppState;

/// Path prefix the fake API is mounted under.
const API_PREFIX: &str = "/api/v1";

/// Token the fake API hands out on sign-in.
pub const TOKEN: &str = "T1";

/// Credentials that pass local validation.
pub const EMAIL: &str = "shopper@example.com";
pub const PASSWORD: &str = "Passw0rd!";

// =============================================================================
// Fake remote API
// =============================================================================

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    /// Redirect to itself forever; the client gives up with a transport error.
    RedirectLoop,
}

/// One request the fake API received.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    replies: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<Call>>,
}

/// Stand-in for the remote e-commerce API.
#[derive(Clone)]
pub struct FakeApi {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
        }
    }

    /// Script the reply for `method path` (path relative to the API root).
    pub fn reply(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
    }

    /// Script a JSON reply.
    pub fn json(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.reply(method, path, Reply::Json(status, body));
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Calls matching `method path`.
    pub fn calls_to(&self, method: &Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == *method && c.path == path)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.calls.lock().unwrap().clear();
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    state.calls.lock().unwrap().push(Call {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(ToString::to_string),
        token: headers
            .get("token")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned();

    match reply {
        Some(Reply::Json(status, body)) => (status, axum::Json(body)).into_response(),
        Some(Reply::RedirectLoop) => (
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, uri.to_string())],
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"statusMsg": "fail", "message": "Route not found"})),
        )
            .into_response(),
    }
}

// =============================================================================
// Canned remote bodies
// =============================================================================

pub fn signin_ok() -> Value {
    json!({
        "message": "success",
        "user": {"name": "Shopper", "email": EMAIL, "role": "user"},
        "token": TOKEN
    })
}

pub fn cart_added(count: u32) -> Value {
    json!({
        "status": "success",
        "message": "Product added successfully to your cart",
        "numOfCartItems": count,
        "cartId": "c1",
        "data": {"_id": "c1", "products": [], "totalCartPrice": 0}
    })
}

pub fn cart_with_line(product_id: &str, quantity: u32) -> Value {
    json!({
        "status": "success",
        "numOfCartItems": 1,
        "cartId": "c1",
        "data": {
            "_id": "c1",
            "products": [{
                "count": quantity,
                "price": 149,
                "product": {"_id": product_id, "title": "Woman Shawl", "imageCover": "cover.jpeg"}
            }],
            "totalCartPrice": 149 * quantity
        }
    })
}

pub fn empty_cart() -> Value {
    json!({
        "status": "success",
        "numOfCartItems": 0,
        "cartId": "c1",
        "data": {"_id": "c1", "products": [], "totalCartPrice": 0}
    })
}

pub fn fail(message: &str) -> Value {
    json!({"statusMsg": "fail", "message": message})
}

// =============================================================================
// Storefront under test
// =============================================================================

/// The storefront router served on an ephemeral port.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub api: FakeApi,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let api = FakeApi::start().await;

        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/freshcart_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            api: EcommerceApiConfig {
                base_url: api.base_url.clone(),
                catalog_cache_ttl: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        // Never connected: sessions live in memory here.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/freshcart_test")
            .unwrap();
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, pool);
        let app = freshcart_storefront::app(state.clone(), session_layer);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            client,
            api,
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn hx_get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn hx_post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Sign in as [`EMAIL`] and receive [`TOKEN`].
    pub async fn sign_in(&self) {
        self.api
            .json(Method::POST, "/auth/signin", StatusCode::OK, signin_ok());
        let response = self
            .post_form("/login", &[("email", EMAIL), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));
    }
}

/// The `Location` header of a redirect.
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// The `HX-Trigger` header parsed as JSON.
pub fn hx_trigger(response: &reqwest::Response) -> Option<Value> {
    let raw = response.headers().get("hx-trigger")?.to_str().ok()?;
    serde_json::from_str(raw).ok()
}

/// The toast message carried in `HX-Trigger`.
pub fn toast(response: &reqwest::Response) -> Option<(String, String)> {
    let trigger = hx_trigger(response)?;
    let toast = trigger.get("toast")?;
    Some((
        toast.get("kind")?.as_str()?.to_string(),
        toast.get("message")?.as_str()?.to_string(),
    ))
}
