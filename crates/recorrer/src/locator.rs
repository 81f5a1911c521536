//! Element locator strategies.
//!
//! Eight strategies, matching what page declarations are allowed to use.
//! Strategy names parse case-insensitively and normalize to the canonical
//! uppercase token; anything else is rejected up front with
//! [`RecorrerError::UnsupportedLocator`] rather than surfacing later as a
//! mystery miss in the driver.

use crate::result::{RecorrerError, RecorrerResult};

/// How to locate an element in the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// By the `id` attribute
    Id(String),
    /// By XPath expression
    XPath(String),
    /// By the `name` attribute
    Name(String),
    /// By CSS selector
    CssSelector(String),
    /// By a single class name
    ClassName(String),
    /// By exact anchor text
    LinkText(String),
    /// By anchor text substring
    PartialLinkText(String),
    /// By tag name
    TagName(String),
}

impl Locator {
    /// Locate by `id` attribute
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// Locate by XPath expression
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    /// Locate by `name` attribute
    pub fn name(value: impl Into<String>) -> Self {
        Self::Name(value.into())
    }

    /// Locate by CSS selector
    pub fn css(value: impl Into<String>) -> Self {
        Self::CssSelector(value.into())
    }

    /// Locate by class name
    pub fn class_name(value: impl Into<String>) -> Self {
        Self::ClassName(value.into())
    }

    /// Locate by exact link text
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::LinkText(value.into())
    }

    /// Locate by link text substring
    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::PartialLinkText(value.into())
    }

    /// Locate by tag name
    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::TagName(value.into())
    }

    /// Build a locator from a strategy name and a value.
    ///
    /// The strategy is case-insensitive (`"id"`, `"Id"` and `"ID"` are the
    /// same); unknown strategies fail with the normalized name in the error.
    pub fn parse(strategy: &str, value: impl Into<String>) -> RecorrerResult<Self> {
        let normalized = strategy.trim().to_uppercase();
        let value = value.into();
        match normalized.as_str() {
            "ID" => Ok(Self::Id(value)),
            "XPATH" => Ok(Self::XPath(value)),
            "NAME" => Ok(Self::Name(value)),
            "CSS_SELECTOR" => Ok(Self::CssSelector(value)),
            "CLASS_NAME" => Ok(Self::ClassName(value)),
            "LINK_TEXT" => Ok(Self::LinkText(value)),
            "PARTIAL_LINK_TEXT" => Ok(Self::PartialLinkText(value)),
            "TAG_NAME" => Ok(Self::TagName(value)),
            _ => Err(RecorrerError::UnsupportedLocator {
                strategy: normalized,
            }),
        }
    }

    /// Canonical uppercase strategy token
    #[must_use]
    pub const fn strategy_name(&self) -> &'static str {
        match self {
            Self::Id(_) => "ID",
            Self::XPath(_) => "XPATH",
            Self::Name(_) => "NAME",
            Self::CssSelector(_) => "CSS_SELECTOR",
            Self::ClassName(_) => "CLASS_NAME",
            Self::LinkText(_) => "LINK_TEXT",
            Self::PartialLinkText(_) => "PARTIAL_LINK_TEXT",
            Self::TagName(_) => "TAG_NAME",
        }
    }

    /// The strategy's value (selector text, attribute value, ...)
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::XPath(v)
            | Self::Name(v)
            | Self::CssSelector(v)
            | Self::ClassName(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v)
            | Self::TagName(v) => v,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy_name(), self.value())
    }
}
