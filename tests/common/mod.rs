use async_trait::async_trait;
use auto_turmas::config::BrowserEngine;
use auto_turmas::domain::ports::{BrowserDriver, DriverLauncher, ElementHandle};
use auto_turmas::utils::error::{EnrollError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the portal: pages are keyed by URL and hold
/// `(scope, selector) -> element ids` lookup tables, so the fake answers the
/// exact queries the engine makes without any HTML parsing.
#[derive(Debug, Default)]
struct PortalState {
    current_url: String,
    elements: HashMap<String, FakeElement>,
    // (page url, scope element id or "", selector) -> element ids
    queries: HashMap<(String, String, String), Vec<String>>,
    navigate_redirects: HashMap<String, String>,
    click_redirects: HashMap<String, String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    typed: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub enabled: bool,
    pub selected: bool,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            attrs: HashMap::new(),
            enabled: true,
            selected: false,
        }
    }
}

impl FakeElement {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_href(href: &str) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert("href".to_string(), href.to_string());
        Self {
            attrs,
            ..Self::default()
        }
    }

    pub fn input(enabled: bool, selected: bool) -> Self {
        Self {
            enabled,
            selected,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePortal {
    state: Arc<Mutex<PortalState>>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(&self) -> FakeDriver {
        FakeDriver {
            state: Arc::clone(&self.state),
        }
    }

    pub fn launcher(&self) -> FakeLauncher {
        FakeLauncher {
            driver: self.driver(),
            launches: Arc::new(Mutex::new(0)),
        }
    }

    pub fn insert_element(&self, id: &str, element: FakeElement) {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(id.to_string(), element);
    }

    /// Register a page-level query result.
    pub fn page_query(&self, page: &str, selector: &str, ids: &[&str]) {
        self.scoped_query(page, "", selector, ids);
    }

    /// Register a query result scoped to an element.
    pub fn scoped_query(&self, page: &str, scope: &str, selector: &str, ids: &[&str]) {
        self.state.lock().unwrap().queries.insert(
            (page.to_string(), scope.to_string(), selector.to_string()),
            ids.iter().map(|id| id.to_string()).collect(),
        );
    }

    /// Navigating to `url` lands on `target` instead (an existing session
    /// skipping the login page, for example).
    pub fn redirect_on_navigate(&self, url: &str, target: &str) {
        self.state
            .lock()
            .unwrap()
            .navigate_redirects
            .insert(url.to_string(), target.to_string());
    }

    /// Clicking the element navigates to `target` (a submit button).
    pub fn redirect_on_click(&self, element_id: &str, target: &str) {
        self.state
            .lock()
            .unwrap()
            .click_redirects
            .insert(element_id.to_string(), target.to_string());
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn typed(&self) -> HashMap<String, String> {
        self.state.lock().unwrap().typed.clone()
    }
}

#[derive(Debug, Clone)]
pub struct FakeDriver {
    state: Arc<Mutex<PortalState>>,
}

impl FakeDriver {
    fn lookup(&self, scope: &str, selector: &str) -> Vec<ElementHandle> {
        let state = self.state.lock().unwrap();
        state
            .queries
            .get(&(
                state.current_url.clone(),
                scope.to_string(),
                selector.to_string(),
            ))
            .map(|ids| ids.iter().map(|id| ElementHandle(id.clone())).collect())
            .unwrap_or_default()
    }

    fn element(&self, handle: &ElementHandle) -> Result<FakeElement> {
        self.state
            .lock()
            .unwrap()
            .elements
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| EnrollError::Driver {
                code: "stale element reference".to_string(),
                message: handle.0.clone(),
            })
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let landed = state
            .navigate_redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        state.navigations.push(url.to_string());
        state.current_url = landed;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn find_optional(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.lookup("", selector).into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        Ok(self.lookup("", selector))
    }

    async fn find_optional_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        Ok(self.lookup(&scope.0, selector).into_iter().next())
    }

    async fn find_all_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        Ok(self.lookup(&scope.0, selector))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(element.0.clone());
        if let Some(clicked) = state.elements.get_mut(&element.0) {
            clicked.selected = true;
        }
        if let Some(target) = state.click_redirects.get(&element.0).cloned() {
            state.current_url = target;
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .typed
            .insert(element.0.clone(), text.to_string());
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        Ok(self.element(element)?.text)
    }

    async fn attr(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attrs.get(name).cloned())
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        Ok(self.element(element)?.enabled)
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool> {
        Ok(self.element(element)?.selected)
    }

    async fn quit(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeLauncher {
    driver: FakeDriver,
    launches: Arc<Mutex<usize>>,
}

impl FakeLauncher {
    pub fn launches(&self) -> usize {
        *self.launches.lock().unwrap()
    }
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self, _engine: BrowserEngine, _headless: bool) -> Result<Self::Driver> {
        *self.launches.lock().unwrap() += 1;
        Ok(self.driver.clone())
    }
}
