//! HTTP client for the pet-store REST API.
//!
//! Thin typed wrapper over the `/pet` endpoints. Every request returns an
//! [`ApiCall`] carrying the status, the body both parsed and raw, and the
//! request latency; the conformance suite asserts on those rather than on
//! exceptions, because several checks expect error statuses on purpose.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Public demo deployment of the pet store.
pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";

/// Pet category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Category identifier
    pub id: i64,
    /// Category label
    pub name: String,
}

/// Pet tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Tag identifier
    pub id: i64,
    /// Tag label
    pub name: String,
}

/// Lifecycle status of a pet in the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Listed for sale
    Available,
    /// Sale in progress
    Pending,
    /// Sold
    Sold,
}

impl PetStatus {
    /// Every valid status, in the order the suite probes them
    pub const ALL: [PetStatus; 3] = [Self::Available, Self::Sold, Self::Pending];

    /// The wire value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pet record as the API trades it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    /// Pet identifier
    pub id: i64,
    /// Category, absent on sparse records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Pet name
    pub name: String,
    /// Photo URLs (`photoUrls` on the wire)
    #[serde(rename = "photoUrls", default)]
    pub photo_urls: Vec<String>,
    /// Tags, absent on sparse records
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Lifecycle status, absent on sparse records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

impl Pet {
    /// The suite's canonical pet: a fresh random id every call, fixed
    /// everything else.
    #[must_use]
    pub fn sample() -> Self {
        Self::sample_with_status(PetStatus::Available)
    }

    /// [`sample`](Self::sample) with an explicit status
    #[must_use]
    pub fn sample_with_status(status: PetStatus) -> Self {
        Self {
            id: random_pet_id(),
            category: Some(Category {
                id: 1,
                name: "dog".to_string(),
            }),
            name: "Fluffy".to_string(),
            photo_urls: vec!["http://img1".to_string()],
            tags: vec![Tag {
                id: 1,
                name: "friendly".to_string(),
            }],
            status: Some(status),
        }
    }
}

/// Error/status envelope the API returns on non-pet responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    /// Numeric code
    pub code: i64,
    /// Message kind (`type` on the wire)
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

/// One finished HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiCall<T> {
    /// HTTP status code
    pub status: u16,
    /// Body parsed as `T`, `None` when it does not parse
    pub body: Option<T>,
    /// Raw body text
    pub raw: String,
    /// Request latency (time to full body)
    pub latency: Duration,
}

impl<T> ApiCall<T> {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Re-parse the raw body as another type
    #[must_use]
    pub fn decode<U: DeserializeOwned>(&self) -> Option<U> {
        serde_json::from_str(&self.raw).ok()
    }
}

/// Errors from the pet-store client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A polling wait ran out
    #[error("timed out after {waited_secs}s: {description}")]
    Timeout {
        /// What was being waited for
        description: String,
        /// The bound that ran out, in seconds
        waited_secs: u64,
    },
}

/// Random 7-digit pet id in `1_000_000..=9_999_999`.
#[must_use]
pub fn random_pet_id() -> i64 {
    let seed = Uuid::new_v4().as_u128();
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let offset = (seed % 9_000_000) as i64;
    1_000_000 + offset
}

/// Random 6-letter lowercase pet name.
#[must_use]
pub fn random_pet_name() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(6)
        .map(|byte| char::from(b'a' + (byte % 26)))
        .collect()
}

/// Poll `attempt` until it yields a value or `max_wait` elapses.
pub(crate) async fn poll_until<F, Fut, T>(
    mut attempt: F,
    max_wait: Duration,
    interval: Duration,
    description: &str,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ApiError>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = attempt().await? {
            return Ok(value);
        }
        if start.elapsed() >= max_wait {
            return Err(ApiError::Timeout {
                description: description.to_string(),
                waited_secs: max_wait.as_secs(),
            });
        }
        tokio::time::sleep(interval).await;
    }
}

async fn finish_call<T: DeserializeOwned>(
    response: reqwest::Response,
    start: Instant,
) -> Result<ApiCall<T>, ApiError> {
    let status = response.status().as_u16();
    let raw = response.text().await?;
    let latency = start.elapsed();
    let body = serde_json::from_str(&raw).ok();
    Ok(ApiCall {
        status,
        body,
        raw,
        latency,
    })
}

/// Client for the `/pet` endpoints.
#[derive(Debug, Clone)]
pub struct PetClient {
    base_url: String,
    client: reqwest::Client,
}

impl PetClient {
    /// Create a client with a 30 second request timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Create a client over a custom reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The configured base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /pet` with a JSON pet
    pub async fn create_pet(&self, pet: &Pet) -> Result<ApiCall<Pet>, ApiError> {
        let start = Instant::now();
        let response = self.client.post(self.url("/pet")).json(pet).send().await?;
        finish_call(response, start).await
    }

    /// `POST /pet` with no body at all (media-type rejection probe)
    pub async fn create_pet_without_body(&self) -> Result<ApiCall<ApiMessage>, ApiError> {
        let start = Instant::now();
        let response = self.client.post(self.url("/pet")).send().await?;
        finish_call(response, start).await
    }

    /// `GET /pet/{id}`
    pub async fn get_pet(&self, pet_id: i64) -> Result<ApiCall<Pet>, ApiError> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url(&format!("/pet/{pet_id}")))
            .send()
            .await?;
        finish_call(response, start).await
    }

    /// `GET /pet/findByStatus` with a valid status
    pub async fn find_pets_by_status(
        &self,
        status: PetStatus,
    ) -> Result<ApiCall<Vec<Pet>>, ApiError> {
        self.find_pets_by_status_raw(status.as_str()).await
    }

    /// `GET /pet/findByStatus` with an arbitrary status string
    pub async fn find_pets_by_status_raw(
        &self,
        status: &str,
    ) -> Result<ApiCall<Vec<Pet>>, ApiError> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url("/pet/findByStatus"))
            .query(&[("status", status)])
            .send()
            .await?;
        finish_call(response, start).await
    }

    /// `PUT /pet` with a JSON pet
    pub async fn update_pet(&self, pet: &Pet) -> Result<ApiCall<Pet>, ApiError> {
        let start = Instant::now();
        let response = self.client.put(self.url("/pet")).json(pet).send().await?;
        finish_call(response, start).await
    }

    /// `PUT /pet` with a raw body sent as JSON (malformed-payload probe)
    pub async fn update_pet_raw(&self, body: &str) -> Result<ApiCall<ApiMessage>, ApiError> {
        let start = Instant::now();
        let response = self
            .client
            .put(self.url("/pet"))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        finish_call(response, start).await
    }

    /// `POST /pet/{id}` with form-encoded name and status
    pub async fn update_pet_with_form(
        &self,
        pet_id: i64,
        name: &str,
        status: &str,
    ) -> Result<ApiCall<ApiMessage>, ApiError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.url(&format!("/pet/{pet_id}")))
            .form(&[("name", name), ("status", status)])
            .send()
            .await?;
        finish_call(response, start).await
    }

    /// `DELETE /pet/{id}`, optionally authenticated with an `api_key` header
    pub async fn delete_pet(
        &self,
        pet_id: i64,
        api_key: Option<&str>,
    ) -> Result<ApiCall<ApiMessage>, ApiError> {
        let start = Instant::now();
        let mut request = self.client.delete(self.url(&format!("/pet/{pet_id}")));
        if let Some(key) = api_key {
            request = request.header("api_key", key);
        }
        let response = request.send().await?;
        finish_call(response, start).await
    }

    /// `POST /pet/{id}/uploadImage` with a multipart file and metadata
    pub async fn upload_image(
        &self,
        pet_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
        additional_metadata: &str,
    ) -> Result<ApiCall<ApiMessage>, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new()
            .text("additionalMetadata", additional_metadata.to_string())
            .part("file", part);

        let start = Instant::now();
        let response = self
            .client
            .post(self.url(&format!("/pet/{pet_id}/uploadImage")))
            .multipart(form)
            .send()
            .await?;
        finish_call(response, start).await
    }

    /// Poll `GET /pet/{id}` until the record is readable.
    ///
    /// Writes propagate to reads with a delay on the demo deployment, so a
    /// create is not observable immediately.
    pub async fn wait_until_pet_visible(
        &self,
        pet_id: i64,
        max_wait: Duration,
        interval: Duration,
    ) -> Result<ApiCall<Pet>, ApiError> {
        let description = format!("pet {pet_id} readable via GET /pet/{pet_id}");
        poll_until(
            || async move {
                let call = self.get_pet(pet_id).await?;
                Ok(if call.status == 200 { Some(call) } else { None })
            },
            max_wait,
            interval,
            &description,
        )
        .await
    }
}
