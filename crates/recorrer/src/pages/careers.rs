//! The careers landing page, reached through the header menu.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::RecorrerResult;
use crate::session::Session;
use crate::wait::WaitOptions;
use std::fmt;

/// Landing-page sections the acceptance scenario asserts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareersSection {
    /// "Find our calling" teams block
    Teams,
    /// Office locations block
    Locations,
    /// Life-at-the-company swiper
    Life,
}

impl CareersSection {
    /// Every section, in on-page order
    pub const ALL: [CareersSection; 3] = [Self::Teams, Self::Locations, Self::Life];

    fn locator(self) -> Locator {
        match self {
            Self::Teams => Locator::id("career-find-our-calling"),
            Self::Locations => Locator::id("career-our-location"),
            Self::Life => Locator::class_name("e-swiper-container"),
        }
    }
}

impl fmt::Display for CareersSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Teams => "teams",
            Self::Locations => "locations",
            Self::Life => "life",
        };
        write!(f, "{label}")
    }
}

/// Page object for the careers landing page.
#[derive(Debug, Clone)]
pub struct CareersPage {
    session: Session,
}

impl PageObject for CareersPage {
    fn from_session(session: &Session) -> RecorrerResult<Self> {
        Ok(Self {
            session: session.clone(),
        })
    }

    fn type_name() -> &'static str {
        "CareersPage"
    }
}

impl CareersPage {
    fn company_menu_item() -> Locator {
        Locator::xpath("//a[contains(text(),'Company')]")
    }

    fn careers_submenu_item(careers_url: &str) -> Locator {
        Locator::css(format!("a[href='{careers_url}']"))
    }

    fn see_all_teams_button() -> Locator {
        Locator::xpath("//a[normalize-space()='See all teams']")
    }

    fn qa_team_card() -> Locator {
        Locator::xpath("//h3[normalize-space()='Quality Assurance']")
    }

    /// Navigate here from the header: Company, then the Careers entry.
    pub fn open_via_menu(&self) -> RecorrerResult<()> {
        let company = self.session.find_one(&Self::company_menu_item())?;
        self.session.click(&company)?;

        let careers_url = self.session.config().careers_url();
        let submenu = self
            .session
            .find_one(&Self::careers_submenu_item(&careers_url))?;
        self.session.click(&submenu)?;
        Ok(())
    }

    /// Whether a section of the page is displayed
    #[must_use]
    pub fn is_section_displayed(&self, section: CareersSection) -> bool {
        self.is_section_displayed_within(section, &WaitOptions::default())
    }

    /// [`is_section_displayed`](Self::is_section_displayed) with an explicit
    /// wait
    #[must_use]
    pub fn is_section_displayed_within(
        &self,
        section: CareersSection,
        options: &WaitOptions,
    ) -> bool {
        let options = options
            .clone()
            .with_message(format!("careers section '{section}' never displayed"));
        self.session
            .wait_until_displayed(&section.locator(), &options)
            .is_ok()
    }

    /// Click "See all teams" to expand the full team list
    pub fn expand_all_teams(&self) -> RecorrerResult<()> {
        let button = self.session.find_one(&Self::see_all_teams_button())?;
        self.session.click(&button)
    }

    /// Click the Quality Assurance team card
    pub fn open_qa_team(&self) -> RecorrerResult<()> {
        let card = self.session.find_one(&Self::qa_team_card())?;
        self.session.click(&card)
    }
}
