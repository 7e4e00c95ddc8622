#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use drinks_api::auth::TokenVerifier;
use drinks_api::config::{AuthConfig, SecurityConfig};
use drinks_api::database::{DrinkDraft, DrinkStore, Ingredient, MemoryDrinkStore};
use drinks_api::{router, AppContext};

pub const ISSUER: &str = "https://coffee-shop.test/";
pub const AUDIENCE: &str = "drinks";
pub const KID: &str = "test-key-1";

const JWKS: &str = include_str!("../fixtures/jwks.json");
const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/test_rsa.pem");

pub const BARISTA: &[&str] = &["get:drinks-detail"];
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// A server running in-process on its own port with a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryDrinkStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn seed(&self, title: &str) -> i32 {
        let draft = DrinkDraft::new(
            title,
            vec![Ingredient {
                color: "brown".into(),
                name: Some("coffee".into()),
                parts: 2,
            }],
        );
        self.store.insert(draft).await.expect("seed drink").id
    }

    pub async fn store_is_empty(&self) -> bool {
        self.store.list_all().await.expect("list drinks").is_empty()
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let auth = AuthConfig {
        issuer: Some(ISSUER.into()),
        audience: Some(AUDIENCE.into()),
        ..AuthConfig::default()
    };
    let verifier = TokenVerifier::from_jwks_json(JWKS, &auth).context("load fixture jwks")?;

    let store = Arc::new(MemoryDrinkStore::new());
    let ctx = AppContext::new(store.clone(), verifier);
    let app = router(
        ctx,
        &SecurityConfig {
            cors_origins: Vec::new(),
        },
    );

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    };
    wait_ready(&server).await?;
    Ok(server)
}

async fn wait_ready(server: &TestServer) -> Result<()> {
    for _ in 0..50 {
        if server.client.get(server.url("/health")).send().await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("server did not become ready on {}", server.base_url)
}

pub fn claims(permissions: &[&str], exp_offset_secs: i64) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|test-user",
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + exp_offset_secs,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY).expect("fixture key");
    encode(&header, claims, &key).expect("sign token")
}

/// A valid token granting `permissions`
pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions, 3600))
}

pub fn expired_token(permissions: &[&str]) -> String {
    sign(&claims(permissions, -3600))
}

pub fn latte() -> Value {
    json!({
        "title": "Latte",
        "recipe": [{"color": "white", "name": "milk", "parts": 1}]
    })
}
