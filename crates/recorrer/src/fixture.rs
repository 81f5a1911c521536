//! Per-test session lifecycle with failure diagnostics.
//!
//! [`TestSession`] owns the session for the duration of one test and runs
//! teardown in `Drop`, so diagnostics and browser cleanup happen on every
//! exit path, early returns and panics included. A test that neither passed
//! nor failed explicitly is treated as failed when the thread is panicking.
//!
//! On failure the teardown scrolls to the last located element (so the
//! screenshot shows where the test was looking) and saves a timestamped PNG
//! under the screenshot directory. Both steps are best-effort: a diagnostics
//! error is logged, never allowed to mask the test's own failure. The
//! session is released afterwards regardless.

use crate::page_object::{PageNamespace, PageRegistry};
use crate::result::RecorrerResult;
use crate::session::Session;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Where and how failure diagnostics are captured.
#[derive(Debug, Clone)]
pub struct DiagnosticsOptions {
    screenshot_dir: PathBuf,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("screenshots"),
        }
    }
}

impl DiagnosticsOptions {
    /// Default diagnostics: screenshots under `screenshots/`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory failure screenshots are written to
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// The configured screenshot directory
    #[must_use]
    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }
}

/// Recorded outcome of the test a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// The test has not reported an outcome yet
    Pending,
    /// The test reported success
    Passed,
    /// The test reported failure
    Failed,
}

/// Session guard for one test.
#[derive(Debug)]
pub struct TestSession {
    test_id: String,
    session: Session,
    diagnostics: DiagnosticsOptions,
    outcome: TestOutcome,
}

impl TestSession {
    /// Guard a session for the named test, with default diagnostics
    #[must_use]
    pub fn new(test_id: impl Into<String>, session: Session) -> Self {
        Self::with_diagnostics(test_id, session, DiagnosticsOptions::default())
    }

    /// Guard a session with explicit diagnostics options
    #[must_use]
    pub fn with_diagnostics(
        test_id: impl Into<String>,
        session: Session,
        diagnostics: DiagnosticsOptions,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            session,
            diagnostics,
            outcome: TestOutcome::Pending,
        }
    }

    /// The guarded session
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Identifier used in diagnostics file names
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// The outcome recorded so far
    #[must_use]
    pub fn outcome(&self) -> TestOutcome {
        self.outcome
    }

    /// Construct every page in `registry` against the guarded session
    pub fn pages(&self, registry: &PageRegistry) -> RecorrerResult<PageNamespace> {
        registry.namespace(&self.session)
    }

    /// Record the test's outcome
    pub fn finish(&mut self, passed: bool) {
        self.outcome = if passed {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        };
    }

    /// Record success
    pub fn pass(&mut self) {
        self.finish(true);
    }

    /// Record failure
    pub fn fail(&mut self) {
        self.finish(false);
    }

    fn capture_failure_diagnostics(&self) {
        if let Some(element) = self.session.last_located() {
            if let Err(err) = self.session.scroll_into_view(&element) {
                tracing::warn!(error = %err, "could not scroll to last located element");
            }
        }

        let file_name = screenshot_file_name(&self.test_id, &Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
        let path = self.diagnostics.screenshot_dir.join(file_name);
        match self.session.save_screenshot(&path) {
            Ok(written) => {
                tracing::info!(test = %self.test_id, path = %written.display(), "failure screenshot saved");
            }
            Err(err) => {
                tracing::warn!(test = %self.test_id, error = %err, "could not capture failure screenshot");
            }
        }
    }
}

impl Drop for TestSession {
    fn drop(&mut self) {
        let failed = self.outcome == TestOutcome::Failed
            || (self.outcome == TestOutcome::Pending && std::thread::panicking());
        if failed {
            self.capture_failure_diagnostics();
        }
        if let Err(err) = self.session.quit() {
            tracing::warn!(error = %err, "session quit failed during teardown");
        }
    }
}

/// Build a screenshot file name from a test identifier and timestamp.
///
/// Path separators and `::` in the identifier are flattened so the name is a
/// single path component.
fn screenshot_file_name(test_id: &str, timestamp: &str) -> String {
    format!("{test_id}_{timestamp}.png")
        .replace('/', "_")
        .replace("::", "__")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::driver::{MockDriver, MockElement};
    use crate::locator::Locator;
    use crate::pages::standard_registry;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn guarded(driver: &MockDriver, dir: &Path) -> TestSession {
        driver.open_window("https://useinsider.com/");
        let session = Session::new(Box::new(driver.clone()), SiteConfig::default());
        TestSession::with_diagnostics(
            "careers/funnel.rs::filters_hold",
            session,
            DiagnosticsOptions::new().with_screenshot_dir(dir),
        )
    }

    fn saved_screenshots(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn sanitizes_test_ids_into_one_path_component() {
        let name = screenshot_file_name("careers/funnel.rs::filters_hold", "2026-02-01_10-30-00");
        assert_eq!(
            name,
            "careers_funnel.rs__filters_hold_2026-02-01_10-30-00.png"
        );
    }

    #[test]
    fn failed_outcome_saves_a_screenshot_and_quits() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();
        driver.set_screenshot_bytes(vec![9, 9, 9]);

        let mut guard = guarded(&driver, dir.path());
        guard.fail();
        drop(guard);

        let names = saved_screenshots(dir.path());
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("careers_funnel.rs__filters_hold_"), "{}", names[0]);
        assert!(names[0].ends_with(".png"));
        let bytes = std::fs::read(dir.path().join(&names[0])).unwrap();
        assert_eq!(bytes, vec![9, 9, 9]);
        assert_eq!(driver.quit_count(), 1);
    }

    #[test]
    fn passed_outcome_saves_nothing_but_still_quits() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();

        let mut guard = guarded(&driver, dir.path());
        guard.pass();
        drop(guard);

        assert!(saved_screenshots(dir.path()).is_empty());
        assert_eq!(driver.quit_count(), 1);
    }

    #[test]
    fn panicking_with_a_pending_outcome_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = guarded(&driver, dir.path());
            panic!("assertion blew up mid-test");
        }));
        assert!(result.is_err());
        assert_eq!(saved_screenshots(dir.path()).len(), 1);
        assert_eq!(driver.quit_count(), 1);
    }

    #[test]
    fn teardown_scrolls_to_the_last_located_element() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();
        driver.add_page(
            "https://useinsider.com/",
            [MockElement::new("div").with_matcher(Locator::id("jobs-list"))],
        );

        let mut guard = guarded(&driver, dir.path());
        guard
            .session()
            .find_one(&Locator::id("jobs-list"))
            .unwrap();
        guard.fail();
        drop(guard);

        assert!(driver.was_called("execute_script:const rect"));
    }

    #[test]
    fn screenshot_failure_never_masks_the_test_result() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();
        driver.fail_screenshots();

        let mut guard = guarded(&driver, dir.path());
        guard.fail();
        drop(guard);

        assert!(saved_screenshots(dir.path()).is_empty());
        assert_eq!(driver.quit_count(), 1);
    }

    #[test]
    fn pages_builds_the_standard_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();
        let mut guard = guarded(&driver, dir.path());
        let pages = guard.pages(&standard_registry().unwrap()).unwrap();
        assert_eq!(pages.len(), 4);
        guard.pass();
    }
}
