//! Shared browser session.
//!
//! One session per test, cloned into every page object: [`Session`] is a
//! cheap handle over shared state holding the boxed driver, the site config,
//! and the last element any lookup located (teardown diagnostics scroll to
//! it). All waits funnel through the wait engine; no method holds the
//! internal borrow across a poll sleep.

use crate::config::SiteConfig;
use crate::driver::{Driver, ElementHandle, ScriptArg};
use crate::locator::Locator;
use crate::result::{RecorrerError, RecorrerResult};
use crate::wait::{self, WaitOptions};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The one click the harness performs: script-level, on the located element.
///
/// A script click bypasses overlay interception (cookie bars, sticky
/// headers) at the cost of skipping native actionability checks. Every
/// click in the harness goes through it so the tradeoff is uniform.
pub const CLICK_SCRIPT: &str = "arguments[0].click();";

/// Fixed page header height compensated when scrolling an element into view
pub const HEADER_OFFSET_PX: i64 = 80;

/// Extra padding above an element scrolled into view
pub const SCROLL_PADDING_PX: i64 = 10;

const SCROLL_SCRIPT: &str = "const rect = arguments[0].getBoundingClientRect();\
 const offset = window.pageYOffset + rect.top - arguments[1] - arguments[2];\
 window.scrollTo({top: offset, behavior: 'instant'});";

struct SessionState {
    driver: Box<dyn Driver>,
    config: SiteConfig,
    last_located: Option<ElementHandle>,
    released: bool,
}

/// Shared handle to one browser session.
#[derive(Clone)]
pub struct Session {
    state: Rc<RefCell<SessionState>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Session")
            .field("config", &state.config)
            .field("released", &state.released)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver and site config into a session
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, config: SiteConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                driver,
                config,
                last_located: None,
                released: false,
            })),
        }
    }

    fn state_mut(&self) -> RecorrerResult<RefMut<'_, SessionState>> {
        let state = self.state.borrow_mut();
        if state.released {
            return Err(RecorrerError::session("session already released"));
        }
        Ok(state)
    }

    /// The configured site endpoints
    #[must_use]
    pub fn config(&self) -> SiteConfig {
        self.state.borrow().config.clone()
    }

    /// Marketing site root
    #[must_use]
    pub fn base_url(&self) -> String {
        self.state.borrow().config.base_url.clone()
    }

    /// Navigate the current window
    pub fn navigate(&self, url: &str) -> RecorrerResult<()> {
        self.state_mut()?.driver.navigate(url)
    }

    /// URL of the current window
    pub fn current_url(&self) -> RecorrerResult<String> {
        self.state_mut()?.driver.current_url()
    }

    /// Find an element, waiting with the default options.
    ///
    /// The found handle is recorded as the last located element.
    pub fn find_one(&self, locator: &Locator) -> RecorrerResult<ElementHandle> {
        self.find_one_with(locator, &WaitOptions::default())
    }

    /// Find an element, waiting with explicit options.
    ///
    /// A `NotFound` miss inside the window is retried on the next poll;
    /// any other driver error aborts the wait.
    pub fn find_one_with(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> RecorrerResult<ElementHandle> {
        let options = if options.message.is_none() {
            options
                .clone()
                .with_message(format!("element never appeared: {locator}"))
        } else {
            options.clone()
        };
        let mut handle: Option<ElementHandle> = None;
        wait::wait_for(
            || {
                let mut state = self.state_mut()?;
                match state.driver.find_element(locator) {
                    Ok(found) => {
                        state.last_located = Some(found.clone());
                        handle = Some(found);
                        Ok(true)
                    }
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            &options,
        )?;
        handle.ok_or_else(|| RecorrerError::not_found(locator.to_string()))
    }

    /// Find an element and wait until it is displayed.
    pub fn wait_until_displayed(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> RecorrerResult<ElementHandle> {
        let options = if options.message.is_none() {
            options
                .clone()
                .with_message(format!("element never displayed: {locator}"))
        } else {
            options.clone()
        };
        let mut handle: Option<ElementHandle> = None;
        wait::wait_for(
            || {
                let mut state = self.state_mut()?;
                match state.driver.find_element(locator) {
                    Ok(found) if found.displayed => {
                        state.last_located = Some(found.clone());
                        handle = Some(found);
                        Ok(true)
                    }
                    Ok(_) => Ok(false),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            &options,
        )?;
        handle.ok_or_else(|| RecorrerError::not_found(locator.to_string()))
    }

    /// All elements matching the locator, read immediately (possibly none)
    pub fn find_all(&self, locator: &Locator) -> RecorrerResult<Vec<ElementHandle>> {
        self.state_mut()?.driver.find_elements(locator)
    }

    /// First descendant of `parent` matching the locator, read immediately
    pub fn find_within(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> RecorrerResult<ElementHandle> {
        self.state_mut()?.driver.find_within(parent, locator)
    }

    /// Attribute of an element, `None` when absent
    pub fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> RecorrerResult<Option<String>> {
        self.state_mut()?.driver.attribute(element, name)
    }

    /// Script-level click on a located element
    pub fn click(&self, element: &ElementHandle) -> RecorrerResult<()> {
        self.execute_script(CLICK_SCRIPT, &[ScriptArg::Element(element.clone())])?;
        Ok(())
    }

    /// Execute a script in the page
    pub fn execute_script(
        &self,
        script: &str,
        args: &[ScriptArg],
    ) -> RecorrerResult<serde_json::Value> {
        self.state_mut()?.driver.execute_script(script, args)
    }

    /// Wait until the current URL differs from `old_url`
    pub fn wait_until_url_changed(&self, old_url: &str) -> RecorrerResult<()> {
        let options =
            WaitOptions::default().with_message(format!("URL did not change: {old_url}"));
        wait::wait_for(|| Ok(self.current_url()? != old_url), &options)?;
        Ok(())
    }

    /// Wait until the current URL contains `fragment`
    pub fn wait_until_url_contains(&self, fragment: &str) -> RecorrerResult<()> {
        let options = WaitOptions::default()
            .with_message(format!("current URL does not contain '{fragment}'"));
        self.wait_until_url_contains_with(fragment, &options)
    }

    fn wait_until_url_contains_with(
        &self,
        fragment: &str,
        options: &WaitOptions,
    ) -> RecorrerResult<()> {
        wait::wait_for(|| Ok(self.current_url()?.contains(fragment)), options)?;
        Ok(())
    }

    /// Handles of all open windows
    pub fn window_handles(&self) -> RecorrerResult<Vec<String>> {
        self.state_mut()?.driver.window_handles()
    }

    /// Assert a single open window and return its handle.
    ///
    /// Funnel steps that later open a second window capture this first so
    /// the handoff has an unambiguous "original" to come back to.
    pub fn capture_current_window(&self) -> RecorrerResult<String> {
        let handles = self.window_handles()?;
        if handles.len() != 1 {
            return Err(RecorrerError::session(format!(
                "expected exactly 1 window, found {}: {:?}",
                handles.len(),
                handles
            )));
        }
        self.state_mut()?.driver.current_window_handle()
    }

    /// Wait for a second window, switch to it, and require its URL to
    /// contain `url_fragment`. Returns the new window's handle.
    pub fn switch_to_new_window(
        &self,
        original_handle: &str,
        url_fragment: &str,
    ) -> RecorrerResult<String> {
        let options =
            WaitOptions::default().with_message("a second window never opened");
        wait::wait_for(|| Ok(self.window_handles()?.len() >= 2), &options)?;

        let target = self
            .window_handles()?
            .into_iter()
            .find(|handle| handle != original_handle)
            .ok_or_else(|| {
                RecorrerError::session("no window other than the original is open")
            })?;
        self.state_mut()?.driver.switch_to_window(&target)?;

        let options = WaitOptions::default().with_message(format!(
            "new window URL does not contain '{url_fragment}'"
        ));
        self.wait_until_url_contains_with(url_fragment, &options)?;
        tracing::debug!(handle = %target, "switched to new window");
        Ok(target)
    }

    /// Close the current window and switch back to the original
    pub fn close_window_and_return(&self, original_handle: &str) -> RecorrerResult<()> {
        self.state_mut()?.driver.close_window()?;
        self.state_mut()?.driver.switch_to_window(original_handle)
    }

    /// Scroll an element into view, compensating for the sticky header
    pub fn scroll_into_view(&self, element: &ElementHandle) -> RecorrerResult<()> {
        self.execute_script(
            SCROLL_SCRIPT,
            &[
                ScriptArg::Element(element.clone()),
                ScriptArg::Json(serde_json::json!(HEADER_OFFSET_PX)),
                ScriptArg::Json(serde_json::json!(SCROLL_PADDING_PX)),
            ],
        )?;
        Ok(())
    }

    /// Capture the current window as PNG bytes
    pub fn screenshot_png(&self) -> RecorrerResult<Vec<u8>> {
        self.state_mut()?.driver.screenshot_png()
    }

    /// Capture a screenshot and write it to `path`
    pub fn save_screenshot(&self, path: &Path) -> RecorrerResult<PathBuf> {
        let bytes = self.screenshot_png()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(path.to_path_buf())
    }

    /// The element most recently located by a find, if any
    #[must_use]
    pub fn last_located(&self) -> Option<ElementHandle> {
        self.state.borrow().last_located.clone()
    }

    /// Release the browser session. Safe to call more than once.
    pub fn quit(&self) -> RecorrerResult<()> {
        let mut state = self.state.borrow_mut();
        if state.released {
            return Ok(());
        }
        state.released = true;
        state.driver.quit()
    }

    /// Whether the session has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state.borrow().released
    }
}
