use std::sync::Arc;
use std::time::Duration;

use cafeteria_rs::repositories::create_pool;
use cafeteria_rs::{create_app, prepare_database, AppState, Config, Metrics};
use reqwest::{redirect::Policy, Client, Response};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TEST_PASSWORD: &str = "secreto123";

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
}

fn test_config() -> Config {
    let settings = config::Config::builder()
        .set_override("database_url", "sqlite::memory:")
        .and_then(|builder| builder.set_override("request_timeout_seconds", "5"))
        .and_then(|builder| builder.build())
        .expect("Failed to build test settings");

    Config::from_settings(&settings).expect("Failed to load test config")
}

impl TestEnvironment {
    /// Boot the full application on a random port over a fresh in-memory database
    pub async fn new() -> Self {
        let config = test_config();
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));

        let pool = create_pool(&config.database)
            .await
            .expect("Failed to create pool");
        prepare_database(&pool, metrics.clone(), true)
            .await
            .expect("Failed to prepare database");

        let app = create_app(AppState::new(pool, metrics), &config);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        // redirects are asserted on, so the client must not follow them
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build client");

        Self { client, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Value {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response")
    }

    pub async fn register(&self, name: &str, email: &str) -> Response {
        self.post_form(
            "/register",
            &[
                ("nombre", name),
                ("correo", email),
                ("telefono", "5551234567"),
                ("contrasena", TEST_PASSWORD),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login", &[("correo", email), ("contrasena", password)])
            .await
    }

    /// Register a fresh account and log it in
    pub async fn signed_in(name: &str, email: &str) -> Self {
        let env = Self::new().await;

        let response = env.register(name, email).await;
        assert_eq!(response.status().as_u16(), 303);

        let response = env.login(email, TEST_PASSWORD).await;
        assert_eq!(response.status().as_u16(), 303);

        env
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
