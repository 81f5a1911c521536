//! Page object wiring.
//!
//! Tests work against a namespace of page objects that share one session.
//! Pages are declared once in a static registration table (see
//! [`register_pages!`]) and constructed together when a test starts, so a
//! missing or misdeclared page fails the setup, not some later step.
//! Namespace keys are derived from the type name by the same
//! CamelCase-to-snake_case rule the page modules have always used.

use crate::result::{RecorrerError, RecorrerResult};
use crate::session::Session;
use regex::Regex;
use std::any::Any;
use std::collections::HashMap;

/// A page or component constructed against the shared session.
pub trait PageObject: Sized {
    /// Build the page object on the shared session
    fn from_session(session: &Session) -> RecorrerResult<Self>;

    /// The declared type name, e.g. `"HomePage"`
    fn type_name() -> &'static str;

    /// Namespace key derived from the type name, e.g. `"home_page"`
    #[must_use]
    fn page_name() -> String {
        camel_to_snake(Self::type_name())
    }
}

/// Derive a snake_case name from a CamelCase type name.
///
/// Two-pass split: acronym boundaries first (`QACareerPage` becomes
/// `QA_Career_Page`), then lower/upper seams, then lowercase.
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let acronym_boundary = Regex::new(r"(.)([A-Z][a-z]+)").unwrap();
    let seam = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
    let first = acronym_boundary.replace_all(name, "${1}_${2}");
    seam.replace_all(&first, "${1}_${2}").to_lowercase()
}

struct RegistryEntry {
    type_name: &'static str,
    derived_name: String,
    build: fn(&Session) -> RecorrerResult<Box<dyn Any>>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("type_name", &self.type_name)
            .field("derived_name", &self.derived_name)
            .finish_non_exhaustive()
    }
}

/// Static registration table of page object types.
#[derive(Debug, Default)]
pub struct PageRegistry {
    entries: Vec<RegistryEntry>,
}

impl PageRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page object type.
    ///
    /// Two types deriving the same namespace key would shadow each other,
    /// which is exactly the silent-miss this table exists to prevent, so a
    /// duplicate fails registration after a warning.
    pub fn register<P: PageObject + 'static>(&mut self) -> RecorrerResult<()> {
        let derived_name = camel_to_snake(P::type_name());
        if let Some(existing) = self
            .entries
            .iter()
            .find(|entry| entry.derived_name == derived_name)
        {
            tracing::warn!(
                derived = %derived_name,
                first = existing.type_name,
                second = P::type_name(),
                "duplicate page name in registry"
            );
            return Err(RecorrerError::construction(format!(
                "duplicate page name '{derived_name}' derived from both {} and {}",
                existing.type_name,
                P::type_name()
            )));
        }
        self.entries.push(RegistryEntry {
            type_name: P::type_name(),
            derived_name,
            build: |session| {
                P::from_session(session).map(|page| Box::new(page) as Box<dyn Any>)
            },
        });
        Ok(())
    }

    /// Registered namespace keys, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.derived_name.as_str())
            .collect()
    }

    /// `(namespace key, type name)` pairs, in registration order
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.derived_name.as_str(), entry.type_name))
            .collect()
    }

    /// Whether a namespace key is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.derived_name == name)
    }

    /// Number of registered page types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct every registered page against the shared session.
    ///
    /// Any constructor failure aborts the whole namespace: a test cannot
    /// start with a partially wired page set.
    pub fn namespace(&self, session: &Session) -> RecorrerResult<PageNamespace> {
        let mut pages: HashMap<String, Box<dyn Any>> = HashMap::new();
        for entry in &self.entries {
            let page = (entry.build)(session).map_err(|err| {
                RecorrerError::construction(format!(
                    "building page object '{}' ({}) failed: {err}",
                    entry.derived_name, entry.type_name
                ))
            })?;
            pages.insert(entry.derived_name.clone(), page);
        }
        tracing::debug!(pages = pages.len(), "page namespace constructed");
        Ok(PageNamespace { pages })
    }
}

/// Fresh per-test namespace of constructed page objects.
#[derive(Default)]
pub struct PageNamespace {
    pages: HashMap<String, Box<dyn Any>>,
}

impl std::fmt::Debug for PageNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageNamespace")
            .field("names", &self.names())
            .finish()
    }
}

impl PageNamespace {
    /// Typed lookup under the type's derived name
    pub fn get<P: PageObject + 'static>(&self) -> RecorrerResult<&P> {
        self.get_by_name(&P::page_name())
    }

    /// Typed lookup under an explicit namespace key
    pub fn get_by_name<P: 'static>(&self, name: &str) -> RecorrerResult<&P> {
        let page = self.pages.get(name).ok_or_else(|| {
            RecorrerError::construction(format!("page object '{name}' is not registered"))
        })?;
        page.downcast_ref::<P>().ok_or_else(|| {
            RecorrerError::construction(format!(
                "page object '{name}' is not a {}",
                std::any::type_name::<P>()
            ))
        })
    }

    /// Namespace keys, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of constructed pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the namespace is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Build a [`PageRegistry`] from a list of page object types.
///
/// Expands to a block returning the registry; duplicate names propagate as
/// errors, so the enclosing function must return `RecorrerResult`.
#[macro_export]
macro_rules! register_pages {
    ($($page:ty),+ $(,)?) => {{
        let mut registry = $crate::page_object::PageRegistry::new();
        $(registry.register::<$page>()?;)+
        registry
    }};
}
