//! The public marketing homepage.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::RecorrerResult;
use crate::session::Session;
use crate::wait::WaitOptions;

/// How long the cookie banner gets to show up before the page is treated as
/// banner-free. The banner depends on region and prior consent state.
pub const COOKIE_BANNER_TIMEOUT_MS: u64 = 5_000;

/// Page object for the site root: cookie consent and the hero banner.
#[derive(Debug, Clone)]
pub struct HomePage {
    session: Session,
}

impl PageObject for HomePage {
    fn from_session(session: &Session) -> RecorrerResult<Self> {
        Ok(Self {
            session: session.clone(),
        })
    }

    fn type_name() -> &'static str {
        "HomePage"
    }
}

impl HomePage {
    fn cookie_banner() -> Locator {
        Locator::id("wt-cli-cookie-banner-title")
    }

    fn accept_cookies_button() -> Locator {
        Locator::id("wt-cli-accept-all-btn")
    }

    fn hero_banner() -> Locator {
        Locator::id("desktop_hero_24")
    }

    /// Navigate to the homepage and dismiss the cookie banner when it shows.
    ///
    /// Returns whether a banner was accepted.
    pub fn open(&self) -> RecorrerResult<bool> {
        let base_url = self.session.base_url();
        self.session.navigate(&base_url)?;
        self.accept_cookies_if_visible()
    }

    /// Accept cookies if the banner appears within its window.
    ///
    /// A banner that never shows is the normal already-consented path, so the
    /// displayed-wait timing out resolves `Ok(false)` rather than erroring.
    pub fn accept_cookies_if_visible(&self) -> RecorrerResult<bool> {
        self.accept_cookies_within(
            &WaitOptions::new().with_timeout(COOKIE_BANNER_TIMEOUT_MS),
        )
    }

    /// [`accept_cookies_if_visible`](Self::accept_cookies_if_visible) with an
    /// explicit banner wait.
    pub fn accept_cookies_within(&self, options: &WaitOptions) -> RecorrerResult<bool> {
        match self.session.wait_until_displayed(&Self::cookie_banner(), options) {
            Ok(_) => {
                let accept = self
                    .session
                    .find_one_with(&Self::accept_cookies_button(), options)?;
                self.session.click(&accept)?;
                tracing::debug!("cookie banner accepted");
                Ok(true)
            }
            Err(err) if err.is_timeout() => {
                tracing::debug!("cookie banner not shown, nothing to accept");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether the hero banner is visible. Any failure reads as `false` so
    /// this can sit directly in an assertion.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.is_loaded_within(&WaitOptions::default())
    }

    /// [`is_loaded`](Self::is_loaded) with an explicit wait
    #[must_use]
    pub fn is_loaded_within(&self, options: &WaitOptions) -> bool {
        self.session
            .wait_until_displayed(&Self::hero_banner(), options)
            .is_ok()
    }
}
