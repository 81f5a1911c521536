//! Filter-consistency waiting for job listings.
//!
//! Selecting a department or location in the vacancies filter triggers an
//! async re-render, and the list that is visible immediately after the click
//! is routinely the stale, unfiltered one. [`FilterWaiter`] models the gap
//! explicitly as a small state machine: a filter request must first observe a
//! DOM change (the list re-rendered at all) and then semantic consistency
//! (every visible item matches the active predicate) before the filter counts
//! as applied. Timeouts report which stage was pending and which predicate
//! values were active.

use crate::fingerprint::{self, ContentFingerprint};
use crate::result::RecorrerResult;
use crate::wait::{self, WaitOptions};
use std::fmt;

/// One scraped job card. Re-read from the DOM on every poll, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobItem {
    /// Position title
    pub title: String,
    /// Department label
    pub department: String,
    /// Location label
    pub location: String,
}

impl JobItem {
    /// Create a job item snapshot
    pub fn new(
        title: impl Into<String>,
        department: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            department: department.into(),
            location: location.into(),
        }
    }
}

/// Conjunction of per-field expectations for the visible job list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    department: Option<String>,
    location: Option<String>,
    title_contains: Option<String>,
}

impl FilterPredicate {
    /// Predicate with no active fields
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact department label
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Require an exact location label
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Require a substring of the position title
    #[must_use]
    pub fn with_title_containing(mut self, fragment: impl Into<String>) -> Self {
        self.title_contains = Some(fragment.into());
        self
    }

    /// Expected department, if any
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Expected location, if any
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Expected title fragment, if any
    #[must_use]
    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    /// Whether no field is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.location.is_none() && self.title_contains.is_none()
    }

    /// Whether a single item satisfies every active field
    #[must_use]
    pub fn matches(&self, item: &JobItem) -> bool {
        if let Some(department) = &self.department {
            if item.department.trim() != department {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if item.location.trim() != location {
                return false;
            }
        }
        if let Some(fragment) = &self.title_contains {
            if !item.title.contains(fragment.as_str()) {
                return false;
            }
        }
        true
    }

    /// Items that fail the predicate, in list order
    #[must_use]
    pub fn mismatches<'a>(&self, items: &'a [JobItem]) -> Vec<&'a JobItem> {
        items.iter().filter(|item| !self.matches(item)).collect()
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(department) = &self.department {
            parts.push(format!("department='{department}'"));
        }
        if let Some(location) = &self.location {
            parts.push(format!("location='{location}'"));
        }
        if let Some(fragment) = &self.title_contains {
            parts.push(format!("title contains '{fragment}'"));
        }
        if parts.is_empty() {
            write!(f, "(no active filters)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Where a filter request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// No filter requested yet
    Idle,
    /// A dropdown option was clicked; no wait has run for it
    FilterRequested,
    /// Waiting for the job list to re-render at all
    AwaitingDomChange,
    /// Waiting for every visible item to match the predicate
    AwaitingSemanticConsistency,
    /// The visible list satisfies the active predicate
    Satisfied,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::FilterRequested => "filter requested",
            Self::AwaitingDomChange => "awaiting dom change",
            Self::AwaitingSemanticConsistency => "awaiting semantic consistency",
            Self::Satisfied => "satisfied",
        };
        write!(f, "{label}")
    }
}

/// State machine coordinating DOM-change and semantic waits for one
/// filtering interaction (possibly spanning several dropdowns).
#[derive(Debug, Clone)]
pub struct FilterWaiter {
    predicate: FilterPredicate,
    options: WaitOptions,
    stage: FilterStage,
}

impl FilterWaiter {
    /// Create a waiter for the given predicate.
    ///
    /// An all-`None` predicate has nothing to wait for and starts (and stays)
    /// `Satisfied`; every wait on it is a no-op.
    #[must_use]
    pub fn new(predicate: FilterPredicate, options: WaitOptions) -> Self {
        let stage = if predicate.is_empty() {
            FilterStage::Satisfied
        } else {
            FilterStage::Idle
        };
        Self {
            predicate,
            options,
            stage,
        }
    }

    /// Current stage
    #[must_use]
    pub fn stage(&self) -> FilterStage {
        self.stage
    }

    /// The active predicate
    #[must_use]
    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    /// Whether the machine has converged
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.stage == FilterStage::Satisfied
    }

    /// Record that a dropdown option was just clicked
    pub fn note_request(&mut self) {
        if self.predicate.is_empty() {
            return;
        }
        self.transition(FilterStage::FilterRequested);
    }

    /// Wait for the job list markup to change from `previous`.
    ///
    /// Returns the re-rendered list's fingerprint and drops back to
    /// `FilterRequested` so the next dropdown in a multi-filter flow can run
    /// its own DOM-change wait.
    pub fn wait_dom_change<F>(
        &mut self,
        previous: &ContentFingerprint,
        fetch_current: F,
    ) -> RecorrerResult<ContentFingerprint>
    where
        F: FnMut() -> RecorrerResult<String>,
    {
        if self.predicate.is_empty() {
            return Ok(previous.clone());
        }
        self.transition(FilterStage::AwaitingDomChange);
        let options = self.stage_options(format!(
            "job list did not re-render after filter request (stage: {}; {})",
            FilterStage::AwaitingDomChange,
            self.predicate
        ));
        let next = fingerprint::wait_for_change(previous, fetch_current, &options)?;
        self.transition(FilterStage::FilterRequested);
        Ok(next)
    }

    /// Wait until every visible job item matches the predicate.
    ///
    /// Items are re-fetched on each poll. An empty read converges vacuously;
    /// callers that also require a non-empty list assert that separately.
    pub fn wait_semantic<F>(&mut self, mut fetch_items: F) -> RecorrerResult<()>
    where
        F: FnMut() -> RecorrerResult<Vec<JobItem>>,
    {
        if self.predicate.is_empty() {
            self.stage = FilterStage::Satisfied;
            return Ok(());
        }
        self.transition(FilterStage::AwaitingSemanticConsistency);
        let options = self.stage_options(format!(
            "job listing never satisfied active filters (stage: {}; {})",
            FilterStage::AwaitingSemanticConsistency,
            self.predicate
        ));
        let predicate = &self.predicate;
        wait::wait_for(
            || {
                let items = fetch_items()?;
                let mismatched = predicate.mismatches(&items);
                if mismatched.is_empty() {
                    Ok(true)
                } else {
                    tracing::debug!(
                        total = items.len(),
                        mismatched = mismatched.len(),
                        "job list not yet consistent with filters"
                    );
                    Ok(false)
                }
            },
            &options,
        )?;
        self.transition(FilterStage::Satisfied);
        Ok(())
    }

    fn stage_options(&self, message: String) -> WaitOptions {
        self.options.clone().with_message(message)
    }

    fn transition(&mut self, next: FilterStage) {
        if self.stage != next {
            tracing::debug!(from = %self.stage, to = %next, "filter wait stage");
        }
        self.stage = next;
    }
}
