//! Pet-store API conformance suite.
//!
//! Runs a fixed sequence of checks against the `/pet` endpoints, covering the
//! create, read, update, upload, and delete paths plus the documented error
//! statuses. Checks run in a lifecycle order that creates one pet up front and
//! deletes it at the end, so a full run leaves nothing behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::client::{ApiMessage, Category, Pet, PetClient, PetStatus, Tag, DEFAULT_BASE_URL};

/// JSON with a leading-zero numeric literal, invalid per RFC 8259.
pub const MALFORMED_UPDATE_BODY: &str =
    r#"{"id": 00012345678900, "name": "BrokenPet", "status": "available"}"#;

/// Minimal JPEG payload for the upload checks: SOI and EOI markers around a
/// short comment segment.
pub const SAMPLE_IMAGE: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x08, b'p', b'h', b'o', b't', b'o', 0x00, 0xFF, 0xD9,
];

/// Metadata string sent with the happy-path upload
const UPLOAD_METADATA: &str = "45g43ewf34wef";

/// Metadata string sent with the missing-pet upload
const MISSING_UPLOAD_METADATA: &str = "uploadimagemetadata";

/// Suite configuration.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// API base URL
    pub base_url: String,
    /// Key sent in the `api_key` header for authenticated deletes
    pub api_key: String,
    /// Upper bound when polling for write propagation
    pub max_wait: Duration,
    /// Delay between polling attempts
    pub poll_interval: Duration,
    /// Stop at the first failed check
    pub fail_fast: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "special-key".to_string(),
            max_wait: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            fail_fast: false,
        }
    }
}

impl SuiteConfig {
    /// Configuration against a non-default deployment
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the delete credential
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Stop at the first failed check
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// One conformance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// `POST /pet` stores a new pet and echoes it back
    CreatePet,
    /// `POST /pet` without a body is rejected with 415
    RejectEmptyCreate,
    /// `GET /pet/{id}` returns the stored pet once writes propagate
    GetPetById,
    /// `GET /pet/0` answers 404 with the documented error envelope
    MissingPetIs404,
    /// `GET /pet/findByStatus` lists a pet under each valid status
    FindByStatus,
    /// `GET /pet/findByStatus` rejects an unknown status with 400
    RejectUnknownStatus,
    /// `PUT /pet` replaces every field and echoes the update
    UpdatePet,
    /// `PUT /pet` with malformed JSON is rejected with 400
    RejectMalformedUpdate,
    /// `PUT /pet` for id 0 answers 404
    UpdateMissingPetIs404,
    /// `POST /pet/{id}` accepts form-encoded name and status
    FormUpdate,
    /// `POST /pet/{id}/uploadImage` accepts a multipart image
    UploadImage,
    /// `POST /pet/0/uploadImage` answers 404
    UploadToMissingPetIs404,
    /// `DELETE /pet/{id}` without a key answers 404
    DeleteWithoutApiKeyIs404,
    /// `DELETE /pet/{id}` with the api key removes the pet
    DeleteWithApiKey,
}

impl Check {
    /// Every check, in execution order
    pub const ALL: [Check; 14] = [
        Self::CreatePet,
        Self::RejectEmptyCreate,
        Self::GetPetById,
        Self::MissingPetIs404,
        Self::FindByStatus,
        Self::RejectUnknownStatus,
        Self::UpdatePet,
        Self::RejectMalformedUpdate,
        Self::UpdateMissingPetIs404,
        Self::FormUpdate,
        Self::UploadImage,
        Self::UploadToMissingPetIs404,
        Self::DeleteWithoutApiKeyIs404,
        Self::DeleteWithApiKey,
    ];

    /// Stable name used in reports
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CreatePet => "create_pet",
            Self::RejectEmptyCreate => "reject_empty_create",
            Self::GetPetById => "get_pet_by_id",
            Self::MissingPetIs404 => "missing_pet_is_404",
            Self::FindByStatus => "find_by_status",
            Self::RejectUnknownStatus => "reject_unknown_status",
            Self::UpdatePet => "update_pet",
            Self::RejectMalformedUpdate => "reject_malformed_update",
            Self::UpdateMissingPetIs404 => "update_missing_pet_is_404",
            Self::FormUpdate => "form_update",
            Self::UploadImage => "upload_image",
            Self::UploadToMissingPetIs404 => "upload_to_missing_pet_is_404",
            Self::DeleteWithoutApiKeyIs404 => "delete_without_api_key_is_404",
            Self::DeleteWithApiKey => "delete_with_api_key",
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check name
    pub name: String,
    /// Whether the check held
    pub passed: bool,
    /// What passed, or what went wrong
    pub detail: String,
    /// Wall-clock time spent on the check
    pub elapsed_ms: u64,
}

/// Report for one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Target deployment
    pub base_url: String,
    /// Total wall-clock time
    pub elapsed_secs: f64,
    /// Per-check outcomes, in execution order
    pub checks: Vec<CheckOutcome>,
}

impl SuiteReport {
    /// Number of checks that held
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Number of checks that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    /// Whether every executed check held
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// The replacement pet sent by the full-update check.
#[must_use]
pub fn updated_pet(pet_id: i64) -> Pet {
    Pet {
        id: pet_id,
        category: Some(Category {
            id: 2,
            name: "updatedhound".to_string(),
        }),
        name: "Rexie".to_string(),
        photo_urls: vec!["http://updatedimg2".to_string()],
        tags: vec![Tag {
            id: 2,
            name: "updatedcute".to_string(),
        }],
        status: Some(PetStatus::Pending),
    }
}

fn expect_status(got: u16, expected: u16, context: &str) -> Result<(), String> {
    if got == expected {
        Ok(())
    } else {
        Err(format!("{context}: expected HTTP {expected}, got {got}"))
    }
}

/// Conformance suite runner.
#[derive(Debug)]
pub struct PetSuite {
    config: SuiteConfig,
    client: PetClient,
}

impl PetSuite {
    /// Build a suite from its configuration
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        let client = PetClient::new(&config.base_url);
        Self { config, client }
    }

    /// The underlying client
    #[must_use]
    pub fn client(&self) -> &PetClient {
        &self.client
    }

    /// Run every check in order and collect a report.
    pub async fn run(&self) -> SuiteReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let pet = Pet::sample();
        tracing::debug!(%run_id, base_url = %self.config.base_url, pet_id = pet.id, "suite starting");

        let mut checks = Vec::with_capacity(Check::ALL.len());
        for check in Check::ALL {
            let check_start = Instant::now();
            let result = self.execute(check, &pet).await;
            #[allow(clippy::cast_possible_truncation)]
            let elapsed_ms = check_start.elapsed().as_millis() as u64;
            let (passed, detail) = match result {
                Ok(detail) => (true, detail),
                Err(detail) => {
                    tracing::warn!(check = check.name(), %detail, "check failed");
                    (false, detail)
                }
            };
            checks.push(CheckOutcome {
                name: check.name().to_string(),
                passed,
                detail,
                elapsed_ms,
            });
            if !passed && self.config.fail_fast {
                break;
            }
        }

        SuiteReport {
            run_id,
            started_at,
            base_url: self.config.base_url.clone(),
            elapsed_secs: start.elapsed().as_secs_f64(),
            checks,
        }
    }

    async fn execute(&self, check: Check, pet: &Pet) -> Result<String, String> {
        match check {
            Check::CreatePet => self.check_create(pet).await,
            Check::RejectEmptyCreate => self.check_reject_empty_create().await,
            Check::GetPetById => self.check_get_by_id(pet).await,
            Check::MissingPetIs404 => self.check_missing_pet().await,
            Check::FindByStatus => self.check_find_by_status().await,
            Check::RejectUnknownStatus => self.check_reject_unknown_status().await,
            Check::UpdatePet => self.check_update(pet).await,
            Check::RejectMalformedUpdate => self.check_reject_malformed_update().await,
            Check::UpdateMissingPetIs404 => self.check_update_missing().await,
            Check::FormUpdate => self.check_form_update(pet).await,
            Check::UploadImage => self.check_upload(pet).await,
            Check::UploadToMissingPetIs404 => self.check_upload_missing().await,
            Check::DeleteWithoutApiKeyIs404 => self.check_delete_without_key(pet).await,
            Check::DeleteWithApiKey => self.check_delete_with_key(pet).await,
        }
    }

    async fn check_create(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .create_pet(pet)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 200, "POST /pet")?;
        let echoed = call
            .body
            .ok_or_else(|| format!("POST /pet returned an unparseable body: {}", call.raw))?;
        if echoed.id != pet.id {
            return Err(format!(
                "created pet echoed id {} instead of {}",
                echoed.id, pet.id
            ));
        }
        if echoed.name != pet.name {
            return Err(format!(
                "created pet echoed name '{}' instead of '{}'",
                echoed.name, pet.name
            ));
        }
        Ok(format!("created pet {}", pet.id))
    }

    async fn check_reject_empty_create(&self) -> Result<String, String> {
        let call = self
            .client
            .create_pet_without_body()
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 415, "POST /pet with no body")?;
        Ok("empty create rejected with 415".to_string())
    }

    async fn check_get_by_id(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .wait_until_pet_visible(pet.id, self.config.max_wait, self.config.poll_interval)
            .await
            .map_err(|e| e.to_string())?;
        let stored = call.body.ok_or_else(|| {
            format!("GET /pet/{} returned an unparseable body: {}", pet.id, call.raw)
        })?;
        if stored.name != pet.name {
            return Err(format!(
                "stored pet has name '{}' instead of '{}'",
                stored.name, pet.name
            ));
        }
        if stored.status != pet.status {
            return Err(format!(
                "stored pet has status {:?} instead of {:?}",
                stored.status, pet.status
            ));
        }
        Ok(format!("pet {} readable with matching fields", pet.id))
    }

    async fn check_missing_pet(&self) -> Result<String, String> {
        let call = self.client.get_pet(0).await.map_err(|e| e.to_string())?;
        expect_status(call.status, 404, "GET /pet/0")?;
        let envelope: ApiMessage = call
            .decode()
            .ok_or_else(|| format!("GET /pet/0 returned an unparseable body: {}", call.raw))?;
        if envelope.code != 1 || envelope.kind != "error" || envelope.message != "Pet not found" {
            return Err(format!("GET /pet/0 returned an unexpected envelope: {}", call.raw));
        }
        Ok("missing pet answered 404 with the documented envelope".to_string())
    }

    async fn check_find_by_status(&self) -> Result<String, String> {
        for status in PetStatus::ALL {
            let probe = Pet::sample_with_status(status);
            let created = self
                .client
                .create_pet(&probe)
                .await
                .map_err(|e| e.to_string())?;
            expect_status(created.status, 200, &format!("POST /pet ({status} probe)"))?;

            let description = format!("pet {} listed under status '{status}'", probe.id);
            let probe_id = probe.id;
            let listed = super::client::poll_until(
                || async move {
                    let call = self
                        .client
                        .find_pets_by_status(status)
                        .await?;
                    if call.status != 200 {
                        return Ok(None);
                    }
                    let found = call
                        .body
                        .unwrap_or_default()
                        .into_iter()
                        .find(|candidate| candidate.id == probe_id);
                    Ok(found)
                },
                self.config.max_wait,
                self.config.poll_interval,
                &description,
            )
            .await
            .map_err(|e| e.to_string())?;

            if listed.name != probe.name {
                return Err(format!(
                    "status '{status}' listing has name '{}' instead of '{}'",
                    listed.name, probe.name
                ));
            }
            if listed.status != Some(status) {
                return Err(format!(
                    "status '{status}' listing carries status {:?}",
                    listed.status
                ));
            }

            // Probe pets are disposable; removal failures only matter to the
            // delete checks.
            let _ = self
                .client
                .delete_pet(probe.id, Some(&self.config.api_key))
                .await;
        }
        Ok("every valid status listed its pet".to_string())
    }

    async fn check_reject_unknown_status(&self) -> Result<String, String> {
        let call = self
            .client
            .find_pets_by_status_raw("unknown")
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 400, "GET /pet/findByStatus?status=unknown")?;
        Ok("unknown status rejected with 400".to_string())
    }

    async fn check_update(&self, pet: &Pet) -> Result<String, String> {
        let replacement = updated_pet(pet.id);
        let call = self
            .client
            .update_pet(&replacement)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 200, "PUT /pet")?;
        let echoed = call
            .body
            .ok_or_else(|| format!("PUT /pet returned an unparseable body: {}", call.raw))?;
        if echoed != replacement {
            return Err(format!("PUT /pet echoed a different pet: {}", call.raw));
        }
        Ok(format!("pet {} fully replaced", pet.id))
    }

    async fn check_reject_malformed_update(&self) -> Result<String, String> {
        let call = self
            .client
            .update_pet_raw(MALFORMED_UPDATE_BODY)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 400, "PUT /pet with malformed JSON")?;
        Ok("malformed update rejected with 400".to_string())
    }

    async fn check_update_missing(&self) -> Result<String, String> {
        let ghost = Pet {
            id: 0,
            category: None,
            name: "ghost".to_string(),
            photo_urls: Vec::new(),
            tags: Vec::new(),
            status: None,
        };
        let call = self
            .client
            .update_pet(&ghost)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 404, "PUT /pet for id 0")?;
        Ok("update of a missing pet answered 404".to_string())
    }

    async fn check_form_update(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .update_pet_with_form(pet.id, "12", "12")
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 200, &format!("POST /pet/{}", pet.id))?;
        let envelope = call.body.ok_or_else(|| {
            format!("POST /pet/{} returned an unparseable body: {}", pet.id, call.raw)
        })?;
        if envelope.message != pet.id.to_string() {
            return Err(format!(
                "form update acknowledged '{}' instead of '{}'",
                envelope.message, pet.id
            ));
        }
        Ok(format!("form update acknowledged pet {}", pet.id))
    }

    async fn check_upload(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .upload_image(pet.id, "photo.jpg", SAMPLE_IMAGE.to_vec(), UPLOAD_METADATA)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 200, &format!("POST /pet/{}/uploadImage", pet.id))?;
        let envelope = call.body.ok_or_else(|| {
            format!("POST /pet/{}/uploadImage returned an unparseable body: {}", pet.id, call.raw)
        })?;
        if envelope.message.is_empty() {
            return Err("upload acknowledged with an empty message".to_string());
        }
        Ok(format!("image accepted for pet {}", pet.id))
    }

    async fn check_upload_missing(&self) -> Result<String, String> {
        let call = self
            .client
            .upload_image(0, "photo.jpg", SAMPLE_IMAGE.to_vec(), MISSING_UPLOAD_METADATA)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 404, "POST /pet/0/uploadImage")?;
        Ok("upload to a missing pet answered 404".to_string())
    }

    async fn check_delete_without_key(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .delete_pet(pet.id, None)
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 404, &format!("DELETE /pet/{} without api_key", pet.id))?;
        Ok("unauthenticated delete answered 404".to_string())
    }

    async fn check_delete_with_key(&self, pet: &Pet) -> Result<String, String> {
        let call = self
            .client
            .delete_pet(pet.id, Some(&self.config.api_key))
            .await
            .map_err(|e| e.to_string())?;
        expect_status(call.status, 200, &format!("DELETE /pet/{}", pet.id))?;
        Ok(format!("pet {} deleted", pet.id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;

        #[test]
        fn defaults_target_the_public_deployment() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.api_key, "special-key");
            assert_eq!(config.max_wait, Duration::from_secs(30));
            assert_eq!(config.poll_interval, Duration::from_secs(2));
            assert!(!config.fail_fast);
        }

        #[test]
        fn builders_override_fields() {
            let config = SuiteConfig::default()
                .with_base_url("http://localhost:8080/v2")
                .with_api_key("local-key")
                .with_fail_fast(true);
            assert_eq!(config.base_url, "http://localhost:8080/v2");
            assert_eq!(config.api_key, "local-key");
            assert!(config.fail_fast);
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn checks_run_create_first_and_delete_last() {
            assert_eq!(Check::ALL.len(), 14);
            assert_eq!(Check::ALL[0], Check::CreatePet);
            assert_eq!(Check::ALL[13], Check::DeleteWithApiKey);

            let position = |check: Check| {
                Check::ALL.iter().position(|c| *c == check).unwrap()
            };
            assert!(position(Check::UploadImage) < position(Check::DeleteWithoutApiKeyIs404));
            assert!(position(Check::DeleteWithoutApiKeyIs404) < position(Check::DeleteWithApiKey));
        }

        #[test]
        fn check_names_are_unique() {
            let mut names: Vec<&str> = Check::ALL.iter().map(|c| c.name()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), Check::ALL.len());
        }

        #[test]
        fn expect_status_reports_both_codes() {
            assert!(expect_status(200, 200, "GET /pet/7").is_ok());
            let err = expect_status(500, 404, "GET /pet/0").unwrap_err();
            assert_eq!(err, "GET /pet/0: expected HTTP 404, got 500");
        }
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn malformed_body_does_not_parse_as_json() {
            assert!(serde_json::from_str::<serde_json::Value>(MALFORMED_UPDATE_BODY).is_err());
        }

        #[test]
        fn sample_image_is_framed_as_a_jpeg() {
            assert_eq!(&SAMPLE_IMAGE[..2], &[0xFF, 0xD8]);
            assert_eq!(&SAMPLE_IMAGE[SAMPLE_IMAGE.len() - 2..], &[0xFF, 0xD9]);
        }

        #[test]
        fn updated_pet_replaces_every_field() {
            let replacement = updated_pet(7);
            assert_eq!(replacement.id, 7);
            assert_eq!(replacement.name, "Rexie");
            assert_eq!(replacement.category.unwrap().name, "updatedhound");
            assert_eq!(replacement.photo_urls, vec!["http://updatedimg2"]);
            assert_eq!(replacement.tags[0].name, "updatedcute");
            assert_eq!(replacement.status, Some(PetStatus::Pending));
        }
    }

    mod report_tests {
        use super::*;

        fn outcome(name: &str, passed: bool) -> CheckOutcome {
            CheckOutcome {
                name: name.to_string(),
                passed,
                detail: String::new(),
                elapsed_ms: 3,
            }
        }

        #[test]
        fn report_counts_split_by_outcome() {
            let report = SuiteReport {
                run_id: Uuid::new_v4(),
                started_at: Utc::now(),
                base_url: DEFAULT_BASE_URL.to_string(),
                elapsed_secs: 1.5,
                checks: vec![
                    outcome("create_pet", true),
                    outcome("get_pet_by_id", true),
                    outcome("update_pet", false),
                ],
            };
            assert_eq!(report.passed(), 2);
            assert_eq!(report.failed(), 1);
            assert!(!report.all_passed());
        }

        #[test]
        fn report_round_trips_through_json() {
            let report = SuiteReport {
                run_id: Uuid::new_v4(),
                started_at: Utc::now(),
                base_url: DEFAULT_BASE_URL.to_string(),
                elapsed_secs: 0.25,
                checks: vec![outcome("create_pet", true)],
            };
            let json = serde_json::to_string(&report).unwrap();
            let back: SuiteReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back.run_id, report.run_id);
            assert_eq!(back.checks.len(), 1);
            assert!(back.all_passed());
        }
    }
}
