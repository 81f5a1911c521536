//! The open-positions listing with its select2 filters.
//!
//! This page is where the funnel's real waiting problems live: the QA
//! department filter is auto-applied asynchronously on arrival, and every
//! dropdown selection re-renders the job list some time after the click.
//! Filtering therefore runs through [`FilterWaiter`] so each interaction is
//! confirmed twice, once structurally (the list re-rendered) and once
//! semantically (the visible cards match the filters).

use crate::driver::ElementHandle;
use crate::filter::{FilterPredicate, FilterWaiter, JobItem};
use crate::fingerprint::{self, ContentFingerprint};
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{RecorrerError, RecorrerResult};
use crate::session::Session;
use crate::wait::{self, WaitOptions};
use std::fmt;

/// Bound for the auto-applied department filter to reach the UI after
/// arriving from the QA team page. Noticeably slower than a user-triggered
/// filter, hence its own constant.
pub const INITIAL_FILTER_TIMEOUT_MS: u64 = 15_000;

/// The two select2 filter dropdowns above the job list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// "Filter by department"
    Department,
    /// "Filter by location"
    Location,
}

impl FilterField {
    fn control_locator(self) -> Locator {
        match self {
            Self::Department => Locator::id("select2-filter-by-department-container"),
            Self::Location => Locator::id("select2-filter-by-location-container"),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Department => "department",
            Self::Location => "location",
        };
        write!(f, "{label}")
    }
}

/// Strip the select2 clear glyph and surrounding whitespace from a control's
/// visible text.
fn normalize_selection(raw: &str) -> String {
    raw.replace('\u{d7}', "").trim().to_string()
}

/// Page object for the job listing.
#[derive(Debug, Clone)]
pub struct VacanciesPage {
    session: Session,
}

impl PageObject for VacanciesPage {
    fn from_session(session: &Session) -> RecorrerResult<Self> {
        Ok(Self {
            session: session.clone(),
        })
    }

    fn type_name() -> &'static str {
        "VacanciesPage"
    }
}

impl VacanciesPage {
    fn jobs_list() -> Locator {
        Locator::id("jobs-list")
    }

    fn job_cards() -> Locator {
        Locator::xpath("//div[@id='jobs-list']/div")
    }

    fn department_select() -> Locator {
        Locator::id("filter-by-department")
    }

    fn checked_option() -> Locator {
        Locator::css("option:checked")
    }

    fn option_item(text: &str) -> Locator {
        Locator::xpath(format!("//li[contains(normalize-space(), '{text}')]"))
    }

    fn card_title() -> Locator {
        Locator::class_name("position-title")
    }

    fn card_department() -> Locator {
        Locator::class_name("position-department")
    }

    fn card_location() -> Locator {
        Locator::class_name("position-location")
    }

    fn view_role_anchor() -> Locator {
        Locator::css("a.btn.btn-navy")
    }

    /// Wait until the underlying department `<select>` reports `expected`.
    ///
    /// Arriving from the QA team page auto-applies the department filter,
    /// but only eventually; the `<select>` is re-found on every poll to
    /// dodge staleness from the re-render.
    pub fn wait_until_department_preselected(&self, expected: &str) -> RecorrerResult<()> {
        self.wait_until_department_preselected_within(
            expected,
            &WaitOptions::new().with_timeout(INITIAL_FILTER_TIMEOUT_MS),
        )
    }

    /// [`wait_until_department_preselected`](Self::wait_until_department_preselected)
    /// with an explicit wait.
    pub fn wait_until_department_preselected_within(
        &self,
        expected: &str,
        options: &WaitOptions,
    ) -> RecorrerResult<()> {
        let options = options.clone().with_message(format!(
            "department selection never changed to '{expected}'"
        ));
        wait::wait_for(
            || {
                let selects = self.session.find_all(&Self::department_select())?;
                let Some(select) = selects.first() else {
                    return Ok(false);
                };
                match self.session.find_within(select, &Self::checked_option()) {
                    Ok(option) => Ok(option.text.trim() == expected),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            &options,
        )?;
        Ok(())
    }

    /// Current innerHTML of the `#jobs-list` container
    pub fn jobs_list_html(&self) -> RecorrerResult<String> {
        let list = self.session.find_one(&Self::jobs_list())?;
        Ok(self
            .session
            .attribute(&list, "innerHTML")?
            .unwrap_or_default())
    }

    /// Fingerprint of the current job list markup
    pub fn jobs_list_fingerprint(&self) -> RecorrerResult<ContentFingerprint> {
        Ok(fingerprint::fingerprint(&self.jobs_list_html()?))
    }

    /// Select an option in one filter dropdown and wait for the list to
    /// re-render. Selecting the already-active option is a no-op.
    pub fn select_filter_option(
        &self,
        field: FilterField,
        option_text: &str,
    ) -> RecorrerResult<()> {
        self.select_filter_option_within(field, option_text, &WaitOptions::default())
    }

    /// [`select_filter_option`](Self::select_filter_option) with an explicit
    /// wait.
    pub fn select_filter_option_within(
        &self,
        field: FilterField,
        option_text: &str,
        options: &WaitOptions,
    ) -> RecorrerResult<()> {
        let predicate = match field {
            FilterField::Department => FilterPredicate::new().with_department(option_text),
            FilterField::Location => FilterPredicate::new().with_location(option_text),
        };
        let mut waiter = FilterWaiter::new(predicate, options.clone());
        self.apply_filter_step(field, option_text, &mut waiter, options)
    }

    /// Select a department in the department dropdown
    pub fn select_department(&self, department: &str) -> RecorrerResult<()> {
        self.select_filter_option(FilterField::Department, department)
    }

    /// Select a location in the location dropdown
    pub fn select_location(&self, location: &str) -> RecorrerResult<()> {
        self.select_filter_option(FilterField::Location, location)
    }

    /// Apply every active filter and wait for the list to agree with them.
    ///
    /// Dropdowns run sequentially, each confirmed by a DOM-change wait, and
    /// the whole interaction finishes with a single semantic wait over the
    /// visible cards. An empty predicate returns immediately.
    pub fn filter_jobs(&self, predicate: &FilterPredicate) -> RecorrerResult<()> {
        self.filter_jobs_within(predicate, &WaitOptions::default())
    }

    /// [`filter_jobs`](Self::filter_jobs) with an explicit wait.
    pub fn filter_jobs_within(
        &self,
        predicate: &FilterPredicate,
        options: &WaitOptions,
    ) -> RecorrerResult<()> {
        if predicate.is_empty() {
            return Ok(());
        }
        let mut waiter = FilterWaiter::new(predicate.clone(), options.clone());

        if let Some(department) = predicate.department() {
            self.apply_filter_step(FilterField::Department, department, &mut waiter, options)?;
        }
        if let Some(location) = predicate.location() {
            self.apply_filter_step(FilterField::Location, location, &mut waiter, options)?;
        }

        waiter.wait_semantic(|| self.job_items())
    }

    fn apply_filter_step(
        &self,
        field: FilterField,
        option_text: &str,
        waiter: &mut FilterWaiter,
        options: &WaitOptions,
    ) -> RecorrerResult<()> {
        let control_options = options
            .clone()
            .with_message(format!("dropdown '{field}' control not present"));
        let control = self
            .session
            .find_one_with(&field.control_locator(), &control_options)?;

        let current = normalize_selection(&control.text);
        if current == option_text {
            tracing::debug!(field = %field, option = option_text, "filter already selected");
            return Ok(());
        }

        let before = self.jobs_list_fingerprint()?;
        self.session.click(&control)?;

        let option_options = options.clone().with_message(format!(
            "option '{option_text}' not available in '{field}' dropdown"
        ));
        let option = self
            .session
            .find_one_with(&Self::option_item(option_text), &option_options)?;
        self.session.click(&option)?;

        waiter.note_request();
        waiter.wait_dom_change(&before, || self.jobs_list_html())?;
        Ok(())
    }

    /// Fresh read of the visible job cards.
    ///
    /// Cards are extracted structurally; a card without the expected inner
    /// elements falls back to splitting its visible text into lines (cards
    /// with fewer than three lines are skipped).
    pub fn job_items(&self) -> RecorrerResult<Vec<JobItem>> {
        let cards = self.session.find_all(&Self::job_cards())?;
        let mut items = Vec::with_capacity(cards.len());
        for card in &cards {
            if let Some(item) = self.extract_card(card)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn extract_card(&self, card: &ElementHandle) -> RecorrerResult<Option<JobItem>> {
        match self.structured_card(card) {
            Ok(item) => Ok(Some(item)),
            Err(err) if err.is_not_found() => Ok(split_card_text(&card.text)),
            Err(err) => Err(err),
        }
    }

    fn structured_card(&self, card: &ElementHandle) -> RecorrerResult<JobItem> {
        let title = self.session.find_within(card, &Self::card_title())?;
        let department = self.session.find_within(card, &Self::card_department())?;
        let location = self.session.find_within(card, &Self::card_location())?;
        Ok(JobItem::new(
            title.text.trim(),
            department.text.trim(),
            location.text.trim(),
        ))
    }

    /// Click the first card's "View Role" anchor.
    ///
    /// The anchor opens the external application form in a new window; the
    /// caller owns the window handoff.
    pub fn click_first_view_role(&self) -> RecorrerResult<()> {
        let cards = self.session.find_all(&Self::job_cards())?;
        let Some(first) = cards.first() else {
            return Err(RecorrerError::not_found("job card under #jobs-list"));
        };
        let anchor = self.session.find_within(first, &Self::view_role_anchor())?;
        self.session.click(&anchor)
    }
}

/// Line-splitting fallback for cards without the structured inner elements.
fn split_card_text(text: &str) -> Option<JobItem> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 3 {
        return None;
    }
    Some(JobItem::new(lines[0], lines[1], lines[2]))
}
