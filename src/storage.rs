/*!
 # Schema storage

 Schemas live on the controller and are reached through its HTTP API:

 * `GET /api/schema/{key}` returns the CSV text
 * `POST /api/schema/{key}` stores a CSV body
 * `POST /api/light/schema` selects the schema the light runs

 [`MemoryStore`] keeps schemas in memory and can simulate an unreachable
 controller.
*/

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

use crate::config::EditorConfig;
use crate::schedule::SchemaKey;
use crate::{Error, Result};

/// Backend holding persisted schemas
pub trait SchemaStore {
    /// Fetches the CSV text stored under `key`
    fn fetch(&self, key: &SchemaKey) -> impl Future<Output = Result<String>> + Send;

    /// Stores `csv` under `key`
    fn store(&self, key: &SchemaKey, csv: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Client for the controller's schema endpoints
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(config: &EditorConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn schema_url(&self, key: &SchemaKey) -> String {
        format!("{}/api/schema/{}", self.base_url, key)
    }

    /// Makes the light run the given schema
    #[instrument(skip(self), fields(key = %key))]
    pub async fn activate(&self, key: &SchemaKey) -> Result<()> {
        let url = format!("{}/api/light/schema", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "schema": key.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Activating {} failed with status {}", key, status);
            return Err(Error::StorageRejected(status.as_u16()));
        }

        info!("Schema {} activated", key);
        Ok(())
    }
}

impl SchemaStore for HttpStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch(&self, key: &SchemaKey) -> Result<String> {
        let url = self.schema_url(key);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::StorageRejected(status.as_u16()));
        }

        let text = response.text().await?;
        debug!("Received {} bytes for {}", text.len(), key);
        Ok(text)
    }

    #[instrument(skip(self, csv), fields(key = %key, bytes = csv.len()))]
    async fn store(&self, key: &SchemaKey, csv: &str) -> Result<()> {
        let url = self.schema_url(key);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/csv")
            .body(csv.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::StorageRejected(status.as_u16()));
        }
        Ok(())
    }
}

/// In-memory schema storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: Mutex<HashMap<SchemaKey, String>>,
    offline: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(self, key: SchemaKey, csv: impl Into<String>) -> Self {
        self.schemas.lock().insert(key, csv.into());
        self
    }

    /// Makes every following request fail as if the controller were unreachable
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    pub fn get(&self, key: &SchemaKey) -> Option<String> {
        self.schemas.lock().get(key).cloned()
    }

    fn check_online(&self) -> Result<()> {
        if *self.offline.lock() {
            Err(Error::StorageUnavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SchemaStore for MemoryStore {
    async fn fetch(&self, key: &SchemaKey) -> Result<String> {
        self.check_online()?;
        self.get(key)
            .ok_or_else(|| Error::StorageUnavailable(format!("no schema stored as {key}")))
    }

    async fn store(&self, key: &SchemaKey, csv: &str) -> Result<()> {
        self.check_online()?;
        self.schemas.lock().insert(key.clone(), csv.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{LoadOutcome, SaveOutcome, ScheduleController, STATUS_ELEMENT};
    use crate::grid::TextGrid;
    use crate::notify::{Catalog, StatusBoard};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers exactly one HTTP request with `status` and `body`
    ///
    /// Returns the base URL to talk to and a handle yielding the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8(request).unwrap()
        });

        (base_url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request
            .lines()
            .take_while(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':'))
            .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    fn body(request: &str) -> &str {
        request.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
    }

    fn http_store(base_url: &str) -> HttpStore {
        HttpStore::new(&EditorConfig::default().with_base_url(base_url)).unwrap()
    }

    fn http_controller(base_url: &str) -> ScheduleController<HttpStore, TextGrid, StatusBoard> {
        ScheduleController::new(
            http_store(base_url),
            TextGrid::default(),
            StatusBoard::default(),
            Catalog::default(),
        )
    }

    #[tokio::test]
    async fn http_fetch_gets_schema_csv() {
        let (base_url, server) = serve_once("200 OK", "10,20,30\n").await;
        let text = http_store(&base_url)
            .fetch(&SchemaKey::numbered(2))
            .await
            .unwrap();
        assert_eq!(text, "10,20,30\n");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/schema/schema_02.csv HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn http_store_posts_csv() {
        let (base_url, server) = serve_once("200 OK", "{\"status\":\"ok\"}").await;
        http_store(&base_url)
            .store(&SchemaKey::numbered(1), "1,2,3,4,5,6\n7,8,9,0,0,250")
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/schema/schema_01.csv HTTP/1.1\r\n"));
        assert_eq!(header(&request, "content-type"), Some("text/csv"));
        assert_eq!(body(&request), "1,2,3,4,5,6\n7,8,9,0,0,250");
    }

    #[tokio::test]
    async fn http_save_rejected_by_device() {
        let key = SchemaKey::numbered(1);
        let (base_url, server) = serve_once("500 Internal Server Error", "").await;
        assert!(matches!(
            http_store(&base_url).store(&key, "1,2,3").await,
            Err(Error::StorageRejected(500))
        ));
        server.await.unwrap();

        let (base_url, server) = serve_once("500 Internal Server Error", "").await;
        let mut controller = http_controller(&base_url);
        let before = controller.schedule().clone();
        assert_eq!(controller.save(&key).await, SaveOutcome::Failed);
        assert_eq!(controller.schedule(), &before);

        let request = server.await.unwrap();
        assert_eq!(header(&request, "content-type"), Some("text/csv"));
        assert_eq!(body(&request).lines().count(), 48);

        let notice = controller.notifier().current(STATUS_ELEMENT).unwrap();
        assert_eq!(
            notice.message,
            "Error: Storage rejected the request with status 500"
        );
    }

    #[tokio::test]
    async fn http_missing_schema_loads_demo() {
        let (base_url, server) = serve_once("404 Not Found", "").await;
        let mut controller = http_controller(&base_url);

        assert_eq!(
            controller.load(&SchemaKey::numbered(3)).await,
            LoadOutcome::Demo
        );
        assert_eq!(controller.schedule(), &crate::Schedule::demo());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/schema/schema_03.csv HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn http_activate_posts_json() {
        let (base_url, server) = serve_once("200 OK", "{}").await;
        http_store(&base_url)
            .activate(&SchemaKey::numbered(2))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/light/schema HTTP/1.1\r\n"));
        assert_eq!(header(&request, "content-type"), Some("application/json"));
        let json: serde_json::Value = serde_json::from_str(body(&request)).unwrap();
        assert_eq!(json, serde_json::json!({ "schema": "schema_02.csv" }));
    }

    #[tokio::test]
    async fn http_activate_rejected() {
        let (base_url, server) = serve_once("404 Not Found", "").await;
        assert!(matches!(
            http_store(&base_url).activate(&SchemaKey::numbered(9)).await,
            Err(Error::StorageRejected(404))
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let key = SchemaKey::numbered(1);
        let store = MemoryStore::new();
        assert!(store.fetch(&key).await.is_err());

        store.store(&key, "1,2,3,4,5,6").await.unwrap();
        assert_eq!(store.fetch(&key).await.unwrap(), "1,2,3,4,5,6");

        store.set_offline(true);
        assert!(matches!(
            store.fetch(&key).await,
            Err(Error::StorageUnavailable(_))
        ));
        assert!(store.store(&key, "").await.is_err());
        assert_eq!(store.get(&key).as_deref(), Some("1,2,3,4,5,6"));
    }

    #[test]
    fn http_urls() {
        let config = EditorConfig::default().with_base_url("http://lamp.local/");
        let store = HttpStore::new(&config).unwrap();
        assert_eq!(
            store.schema_url(&SchemaKey::numbered(3)),
            "http://lamp.local/api/schema/schema_03.csv"
        );
    }
}
