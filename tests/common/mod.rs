#![allow(dead_code)]

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use storefront_rs::config::{
    Config, EventsConfig, ObservabilityConfig, ServerConfig, StorageConfig,
};
use storefront_rs::{create_app, AppComponents};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub ws_url: String,
    pub components: AppComponents,
    pub config: Config,
    // Keeps the data directory alive for the lifetime of the server
    _data_dir: TempDir,
}

pub fn create_test_config(data_dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_seconds: 10,
            max_request_size: 1024 * 1024,
        },
        storage: StorageConfig {
            data_dir: data_dir.path().join("data"),
            products_file: "products.json".to_string(),
            carts_file: "carts.json".to_string(),
            seed_catalog: false,
        },
        events: EventsConfig {
            channel_capacity: 32,
        },
        observability: ObservabilityConfig {
            service_name: "storefront-rs".to_string(),
            service_version: "test".to_string(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            enable_json_logging: false,
        },
    }
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let data_dir = TempDir::new().expect("Failed to create data directory");
        let config = create_test_config(&data_dir);
        let components = AppComponents::from_config(&config).expect("Failed to build components");
        let app = create_app(&components, &config.server);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url: format!("http://{}", addr),
            ws_url: format!("ws://{}/ws/products", addr),
            components,
            config,
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_product(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/products"))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn seed_test_data(&self) {
        let response = self
            .client
            .post(self.url("/api/admin/seed"))
            .send()
            .await
            .expect("Failed to seed test data");

        assert_eq!(response.status().as_u16(), 200);
    }

    /// Raw contents of the products collection file
    pub async fn stored_products(&self) -> Value {
        let content = tokio::fs::read_to_string(self.config.storage.products_path())
            .await
            .expect("Failed to read products file");
        serde_json::from_str(&content).expect("Products file is not valid JSON")
    }
}

pub fn sample_product() -> Value {
    json!({
        "title": "A",
        "description": "d",
        "code": "c",
        "price": "100",
        "category": "x"
    })
}
