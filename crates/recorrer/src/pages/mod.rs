//! Concrete page objects for the marketing-site careers funnel.
//!
//! Four pages cover the scenario from landing to the external application
//! form: [`HomePage`] (cookie banner, hero), [`CareersPage`] (header menu
//! navigation, section checks, team cards), [`QaCareersPage`] (entry into
//! the QA job listing) and [`VacanciesPage`] (select2 filters, job cards,
//! view-role handoff). All of them are thin over the shared [`Session`]:
//! locators live here, waiting and clicking live there.
//!
//! [`Session`]: crate::session::Session

mod careers;
mod home;
mod qa_careers;
mod vacancies;

pub use careers::{CareersPage, CareersSection};
pub use home::{HomePage, COOKIE_BANNER_TIMEOUT_MS};
pub use qa_careers::QaCareersPage;
pub use vacancies::{FilterField, VacanciesPage, INITIAL_FILTER_TIMEOUT_MS};

use crate::page_object::PageRegistry;
use crate::register_pages;
use crate::result::RecorrerResult;

/// The registry every funnel test starts from.
pub fn standard_registry() -> RecorrerResult<PageRegistry> {
    Ok(register_pages![
        HomePage,
        CareersPage,
        QaCareersPage,
        VacanciesPage,
    ])
}
