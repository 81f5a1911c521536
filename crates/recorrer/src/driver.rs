//! Browser driver boundary.
//!
//! The harness talks to a browser only through the [`Driver`] trait: an
//! opaque capability for navigation, element lookup, script execution and
//! window bookkeeping. Element handles are value snapshots taken at find
//! time; nothing read through a handle is cached across polls.
//!
//! [`MockDriver`] is the in-process implementation the test suites run on.
//! It serves a scripted DOM keyed by URL, supports staged text/attribute
//! sequences for pages that change while being polled, and applies
//! registered click effects so interactions cause the same state changes a
//! real page would.

use crate::locator::Locator;
use crate::result::{RecorrerError, RecorrerResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::rc::Rc;

/// Element handle for DOM interactions. A snapshot, not a live reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Driver-assigned identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Text content at find time
    pub text: String,
    /// Whether the element was displayed at find time
    pub displayed: bool,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text: String::new(),
            displayed: true,
        }
    }
}

/// Argument passed to an in-page script.
#[derive(Debug, Clone)]
pub enum ScriptArg {
    /// A previously located element
    Element(ElementHandle),
    /// A plain JSON value
    Json(serde_json::Value),
}

/// Abstract browser capability.
///
/// A real WebDriver/BiDi backend would implement this same trait; the
/// harness never reaches around it.
pub trait Driver {
    /// Navigate the current window to a URL
    fn navigate(&mut self, url: &str) -> RecorrerResult<()>;

    /// URL of the current window
    fn current_url(&mut self) -> RecorrerResult<String>;

    /// Find the first element matching the locator
    fn find_element(&mut self, locator: &Locator) -> RecorrerResult<ElementHandle>;

    /// Find all elements matching the locator (possibly none)
    fn find_elements(&mut self, locator: &Locator) -> RecorrerResult<Vec<ElementHandle>>;

    /// Find the first descendant of `parent` matching the locator
    fn find_within(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> RecorrerResult<ElementHandle>;

    /// Read an attribute of an element, `None` when absent
    fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> RecorrerResult<Option<String>>;

    /// Execute a script in the page
    fn execute_script(
        &mut self,
        script: &str,
        args: &[ScriptArg],
    ) -> RecorrerResult<serde_json::Value>;

    /// Handles of all open windows
    fn window_handles(&mut self) -> RecorrerResult<Vec<String>>;

    /// Handle of the current window
    fn current_window_handle(&mut self) -> RecorrerResult<String>;

    /// Switch to the window with the given handle
    fn switch_to_window(&mut self, handle: &str) -> RecorrerResult<()>;

    /// Close the current window
    fn close_window(&mut self) -> RecorrerResult<()>;

    /// Capture the current window as PNG bytes
    fn screenshot_png(&mut self) -> RecorrerResult<Vec<u8>>;

    /// End the browser session
    fn quit(&mut self) -> RecorrerResult<()>;
}

/// Scripted element for the mock DOM.
///
/// `texts` and attribute values are sequences: every snapshot advances one
/// step and the last value sticks, which models content that settles while
/// the harness polls it.
#[derive(Debug, Clone)]
pub struct MockElement {
    tag_name: String,
    matchers: Vec<Locator>,
    texts: Vec<String>,
    text_cursor: usize,
    attrs: HashMap<String, AttrScript>,
    displayed: bool,
    appear_after_queries: usize,
    queries_seen: usize,
    children: Vec<MockElement>,
    id: String,
}

#[derive(Debug, Clone)]
struct AttrScript {
    values: Vec<String>,
    cursor: usize,
}

impl AttrScript {
    fn advance(&mut self) -> String {
        let value = self.values[self.cursor.min(self.values.len() - 1)].clone();
        if self.cursor + 1 < self.values.len() {
            self.cursor += 1;
        }
        value
    }

    fn push_final(&mut self, value: String) {
        self.values.push(value);
        self.cursor = self.values.len() - 1;
    }
}

impl MockElement {
    /// New element with a tag name
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            matchers: Vec::new(),
            texts: vec![String::new()],
            text_cursor: 0,
            attrs: HashMap::new(),
            displayed: true,
            appear_after_queries: 0,
            queries_seen: 0,
            children: Vec::new(),
            id: String::new(),
        }
    }

    /// Add a locator this element answers to
    #[must_use]
    pub fn with_matcher(mut self, locator: Locator) -> Self {
        self.matchers.push(locator);
        self
    }

    /// Fixed text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.texts = vec![text.into()];
        self
    }

    /// Staged text content: one value per snapshot, last value sticks
    #[must_use]
    pub fn with_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts = texts.into_iter().map(Into::into).collect();
        if self.texts.is_empty() {
            self.texts.push(String::new());
        }
        self
    }

    /// Fixed attribute value
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(
            name.into(),
            AttrScript {
                values: vec![value.into()],
                cursor: 0,
            },
        );
        self
    }

    /// Staged attribute values: one per read, last value sticks
    #[must_use]
    pub fn with_attr_sequence<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.attrs.insert(
            name.into(),
            AttrScript {
                values: if values.is_empty() {
                    vec![String::new()]
                } else {
                    values
                },
            cursor: 0,
            },
        );
        self
    }

    /// Mark the element hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Element only becomes findable after this many lookups for it
    #[must_use]
    pub fn appears_after(mut self, queries: usize) -> Self {
        self.appear_after_queries = queries;
        self
    }

    /// Nest a child element
    #[must_use]
    pub fn with_child(mut self, child: MockElement) -> Self {
        self.children.push(child);
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        self.matchers.iter().any(|m| m == locator)
    }

    fn snapshot(&mut self) -> ElementHandle {
        let text = self.texts[self.text_cursor.min(self.texts.len() - 1)].clone();
        if self.text_cursor + 1 < self.texts.len() {
            self.text_cursor += 1;
        }
        ElementHandle {
            id: self.id.clone(),
            tag_name: self.tag_name.clone(),
            text,
            displayed: self.displayed,
        }
    }
}

/// State change a click on a matching element applies to the mock page.
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Append a final value to an element's attribute sequence
    SetAttribute {
        /// Element to mutate
        target: Locator,
        /// Attribute name
        name: String,
        /// New value (subsequent reads see it)
        value: String,
    },
    /// Replace every top-level element matching `target` with `elements`
    ReplaceMatching {
        /// Elements to remove
        target: Locator,
        /// Replacement elements
        elements: Vec<MockElement>,
    },
    /// Navigate the current window
    Navigate {
        /// Destination URL
        url: String,
    },
    /// Open a new window without switching to it
    OpenWindow {
        /// URL of the new window
        url: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, Vec<MockElement>>,
    windows: Vec<MockWindow>,
    current_window: Option<usize>,
    click_effects: Vec<(Locator, ClickEffect)>,
    script_results: VecDeque<serde_json::Value>,
    call_history: Vec<String>,
    screenshot_bytes: Vec<u8>,
    fail_screenshot: bool,
    quit_count: usize,
    next_element_id: u64,
    next_window_id: u64,
}

#[derive(Debug, Clone)]
struct MockWindow {
    handle: String,
    url: String,
}

impl MockState {
    fn assign_ids(&mut self, element: &mut MockElement) {
        element.id = format!("el-{}", self.next_element_id);
        self.next_element_id += 1;
        for child in &mut element.children {
            self.assign_ids(child);
        }
    }

    fn open_window(&mut self, url: &str) -> String {
        let handle = format!("window-{}", self.next_window_id);
        self.next_window_id += 1;
        self.windows.push(MockWindow {
            handle: handle.clone(),
            url: url.to_string(),
        });
        if self.current_window.is_none() {
            self.current_window = Some(0);
        }
        handle
    }

    fn current_window(&self) -> RecorrerResult<&MockWindow> {
        self.current_window
            .and_then(|idx| self.windows.get(idx))
            .ok_or_else(|| RecorrerError::session("no window is open"))
    }

    fn current_page_mut(&mut self) -> RecorrerResult<&mut Vec<MockElement>> {
        let url = self.current_window()?.url.clone();
        Ok(self.pages.entry(url).or_default())
    }

    fn find_in_page(
        &mut self,
        locator: &Locator,
        take_all: bool,
    ) -> RecorrerResult<Vec<ElementHandle>> {
        let page = self.current_page_mut()?;
        let mut found = Vec::new();
        for element in page.iter_mut() {
            collect_matches(element, locator, take_all, &mut found);
            if !take_all && !found.is_empty() {
                break;
            }
        }
        Ok(found)
    }

    fn element_mut<'a>(
        elements: &'a mut [MockElement],
        id: &str,
    ) -> Option<&'a mut MockElement> {
        for element in elements {
            if element.id == id {
                return Some(element);
            }
            if let Some(found) = Self::element_mut(&mut element.children, id) {
                return Some(found);
            }
        }
        None
    }

    fn apply_click(&mut self, handle_id: &str) -> RecorrerResult<()> {
        let url = self.current_window()?.url.clone();
        let matchers = {
            let page = self.pages.entry(url).or_default();
            let Some(element) = Self::element_mut(page, handle_id) else {
                return Err(RecorrerError::script(format!(
                    "clicked element {handle_id} is no longer attached"
                )));
            };
            element.matchers.clone()
        };

        let effects: Vec<ClickEffect> = self
            .click_effects
            .iter()
            .filter(|(locator, _)| matchers.contains(locator))
            .map(|(_, effect)| effect.clone())
            .collect();

        for effect in effects {
            self.apply_effect(effect)?;
        }
        Ok(())
    }

    fn apply_effect(&mut self, effect: ClickEffect) -> RecorrerResult<()> {
        match effect {
            ClickEffect::SetAttribute {
                target,
                name,
                value,
            } => {
                let page = self.current_page_mut()?;
                for element in page.iter_mut() {
                    set_attr_recursive(element, &target, &name, &value);
                }
            }
            ClickEffect::ReplaceMatching { target, elements } => {
                let mut prepared = Vec::with_capacity(elements.len());
                for mut element in elements {
                    self.assign_ids(&mut element);
                    prepared.push(element);
                }
                let page = self.current_page_mut()?;
                page.retain(|element| !element.matches(&target));
                page.extend(prepared);
            }
            ClickEffect::Navigate { url } => {
                let idx = self
                    .current_window
                    .ok_or_else(|| RecorrerError::session("no window is open"))?;
                self.windows[idx].url = url;
            }
            ClickEffect::OpenWindow { url } => {
                self.open_window(&url);
            }
        }
        Ok(())
    }
}

fn collect_matches(
    element: &mut MockElement,
    locator: &Locator,
    take_all: bool,
    found: &mut Vec<ElementHandle>,
) {
    if element.matches(locator) {
        element.queries_seen += 1;
        if element.queries_seen > element.appear_after_queries {
            found.push(element.snapshot());
            if !take_all {
                return;
            }
        }
    }
    for child in &mut element.children {
        collect_matches(child, locator, take_all, found);
        if !take_all && !found.is_empty() {
            return;
        }
    }
}

fn set_attr_recursive(element: &mut MockElement, target: &Locator, name: &str, value: &str) {
    if element.matches(target) {
        element
            .attrs
            .entry(name.to_string())
            .or_insert_with(|| AttrScript {
                values: Vec::new(),
                cursor: 0,
            })
            .push_final(value.to_string());
    }
    for child in &mut element.children {
        set_attr_recursive(child, target, name, value);
    }
}

/// Scripted in-process driver for the test suites.
///
/// Cloning shares state, so a test can keep a handle for inspection after
/// the session takes ownership of the boxed driver.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Rc<RefCell<MockState>>,
}

impl MockDriver {
    /// Create a new mock driver with no windows or pages
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the elements served at a URL
    pub fn add_page<I>(&self, url: impl Into<String>, elements: I)
    where
        I: IntoIterator<Item = MockElement>,
    {
        let mut state = self.state.borrow_mut();
        let mut prepared = Vec::new();
        for mut element in elements {
            state.assign_ids(&mut element);
            prepared.push(element);
        }
        state.pages.insert(url.into(), prepared);
    }

    /// Open a window at a URL, returning its handle
    pub fn open_window(&self, url: impl Into<String>) -> String {
        self.state.borrow_mut().open_window(&url.into())
    }

    /// Register a click effect: clicking any element matching `clicked`
    /// applies `effect`
    pub fn on_click(&self, clicked: Locator, effect: ClickEffect) {
        self.state.borrow_mut().click_effects.push((clicked, effect));
    }

    /// Queue a script result (served FIFO; clicks and scrolls default to null)
    pub fn push_script_result(&self, result: serde_json::Value) {
        self.state.borrow_mut().script_results.push_back(result);
    }

    /// Set the PNG bytes served by `screenshot_png`
    pub fn set_screenshot_bytes(&self, bytes: Vec<u8>) {
        self.state.borrow_mut().screenshot_bytes = bytes;
    }

    /// Make `screenshot_png` fail (diagnostics-path testing)
    pub fn fail_screenshots(&self) {
        self.state.borrow_mut().fail_screenshot = true;
    }

    /// Full call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().call_history.clone()
    }

    /// Check if a method was called (prefix match, as recorded)
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .borrow()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of calls with the given prefix
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .borrow()
            .call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// How many times `quit` ran
    #[must_use]
    pub fn quit_count(&self) -> usize {
        self.state.borrow().quit_count
    }
}

impl Driver for MockDriver {
    fn navigate(&mut self, url: &str) -> RecorrerResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("navigate:{url}"));
        if state.windows.is_empty() {
            state.open_window(url);
        } else {
            let idx = state
                .current_window
                .ok_or_else(|| RecorrerError::session("no window is open"))?;
            state.windows[idx].url = url.to_string();
        }
        Ok(())
    }

    fn current_url(&mut self) -> RecorrerResult<String> {
        let state = self.state.borrow();
        Ok(state.current_window()?.url.clone())
    }

    fn find_element(&mut self, locator: &Locator) -> RecorrerResult<ElementHandle> {
        let mut state = self.state.borrow_mut();
        state
            .call_history
            .push(format!("find_element:{locator}"));
        state
            .find_in_page(locator, false)?
            .into_iter()
            .next()
            .ok_or_else(|| RecorrerError::not_found(locator.to_string()))
    }

    fn find_elements(&mut self, locator: &Locator) -> RecorrerResult<Vec<ElementHandle>> {
        let mut state = self.state.borrow_mut();
        state
            .call_history
            .push(format!("find_elements:{locator}"));
        state.find_in_page(locator, true)
    }

    fn find_within(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> RecorrerResult<ElementHandle> {
        let mut state = self.state.borrow_mut();
        state
            .call_history
            .push(format!("find_within:{}:{locator}", parent.id));
        let url = state.current_window()?.url.clone();
        let page = state.pages.entry(url).or_default();
        let Some(parent_element) = MockState::element_mut(page, &parent.id) else {
            return Err(RecorrerError::not_found(format!(
                "parent {} is no longer attached",
                parent.id
            )));
        };
        let mut found = Vec::new();
        for child in &mut parent_element.children {
            collect_matches(child, locator, false, &mut found);
            if !found.is_empty() {
                break;
            }
        }
        found
            .into_iter()
            .next()
            .ok_or_else(|| RecorrerError::not_found(locator.to_string()))
    }

    fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> RecorrerResult<Option<String>> {
        let mut state = self.state.borrow_mut();
        state
            .call_history
            .push(format!("attribute:{}:{name}", element.id));
        let url = state.current_window()?.url.clone();
        let page = state.pages.entry(url).or_default();
        let Some(found) = MockState::element_mut(page, &element.id) else {
            return Err(RecorrerError::not_found(format!(
                "element {} is no longer attached",
                element.id
            )));
        };
        Ok(found.attrs.get_mut(name).map(AttrScript::advance))
    }

    fn execute_script(
        &mut self,
        script: &str,
        args: &[ScriptArg],
    ) -> RecorrerResult<serde_json::Value> {
        {
            let mut state = self.state.borrow_mut();
            state.call_history.push(format!("execute_script:{script}"));
        }
        if script.contains(".click()") {
            if let Some(ScriptArg::Element(handle)) = args.first() {
                let id = handle.id.clone();
                self.state.borrow_mut().apply_click(&id)?;
            }
        }
        Ok(self
            .state
            .borrow_mut()
            .script_results
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    fn window_handles(&mut self) -> RecorrerResult<Vec<String>> {
        let mut state = self.state.borrow_mut();
        state.call_history.push("window_handles".to_string());
        Ok(state.windows.iter().map(|w| w.handle.clone()).collect())
    }

    fn current_window_handle(&mut self) -> RecorrerResult<String> {
        let state = self.state.borrow();
        Ok(state.current_window()?.handle.clone())
    }

    fn switch_to_window(&mut self, handle: &str) -> RecorrerResult<()> {
        let mut state = self.state.borrow_mut();
        state
            .call_history
            .push(format!("switch_to_window:{handle}"));
        let idx = state
            .windows
            .iter()
            .position(|w| w.handle == handle)
            .ok_or_else(|| {
                RecorrerError::session(format!("no window with handle {handle}"))
            })?;
        state.current_window = Some(idx);
        Ok(())
    }

    fn close_window(&mut self) -> RecorrerResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push("close_window".to_string());
        let idx = state
            .current_window
            .ok_or_else(|| RecorrerError::session("no window is open"))?;
        state.windows.remove(idx);
        state.current_window = None;
        Ok(())
    }

    fn screenshot_png(&mut self) -> RecorrerResult<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.call_history.push("screenshot_png".to_string());
        if state.fail_screenshot {
            return Err(RecorrerError::session("screenshot capture failed"));
        }
        if state.screenshot_bytes.is_empty() {
            // Enough bytes to look like a PNG in a directory listing.
            return Ok(b"\x89PNG\r\n\x1a\n".to_vec());
        }
        Ok(state.screenshot_bytes.clone())
    }

    fn quit(&mut self) -> RecorrerResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push("quit".to_string());
        state.quit_count += 1;
        Ok(())
    }
}
