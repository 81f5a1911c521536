//! The Quality Assurance team's careers lander.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::RecorrerResult;
use crate::session::Session;

/// Page object for the QA team page; its one job is entering the listing.
#[derive(Debug, Clone)]
pub struct QaCareersPage {
    session: Session,
}

impl PageObject for QaCareersPage {
    fn from_session(session: &Session) -> RecorrerResult<Self> {
        Ok(Self {
            session: session.clone(),
        })
    }

    fn type_name() -> &'static str {
        "QaCareersPage"
    }
}

impl QaCareersPage {
    fn see_all_qa_jobs_button() -> Locator {
        Locator::xpath("//a[normalize-space()='See all QA jobs']")
    }

    /// Click "See all QA jobs" to reach the open-positions listing
    pub fn open_all_qa_jobs(&self) -> RecorrerResult<()> {
        let button = self.session.find_one(&Self::see_all_qa_jobs_button())?;
        self.session.click(&button)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::driver::{ClickEffect, MockDriver, MockElement};

    #[test]
    fn open_all_qa_jobs_navigates_to_the_listing() {
        let qa_url = "https://useinsider.com/careers/quality-assurance/";
        let listing_url = "https://useinsider.com/careers/open-positions/?department=qualityassurance";
        let driver = MockDriver::new();
        driver.add_page(
            qa_url,
            [MockElement::new("a")
                .with_matcher(QaCareersPage::see_all_qa_jobs_button())
                .with_text("See all QA jobs")],
        );
        driver.on_click(
            QaCareersPage::see_all_qa_jobs_button(),
            ClickEffect::Navigate {
                url: listing_url.to_string(),
            },
        );
        driver.open_window(qa_url);

        let session = Session::new(Box::new(driver.clone()), SiteConfig::default());
        let page = QaCareersPage::from_session(&session).unwrap();
        page.open_all_qa_jobs().unwrap();
        assert_eq!(session.current_url().unwrap(), listing_url);
    }
}
