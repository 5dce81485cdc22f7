use crate::config::BrowserEngine;
use crate::utils::error::{EnrollError, Result};
use async_trait::async_trait;

/// Opaque reference to a located page element. Only meaningful to the driver
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(pub String);

/// Browser automation capability. The enrollment core only ever talks to the
/// portal through this interface; the concrete automation binding lives in
/// the adapters layer.
///
/// `find_optional` exists for probing selectors that legitimately may not be
/// present (e.g. a save control); `find` is for structural elements whose
/// absence is an error.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn current_url(&self) -> Result<String>;

    async fn find_optional(&self, selector: &str) -> Result<Option<ElementHandle>>;
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;
    async fn find_optional_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>>;
    async fn find_all_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;
    async fn text(&self, element: &ElementHandle) -> Result<String>;
    async fn attr(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;
    async fn is_selected(&self, element: &ElementHandle) -> Result<bool>;

    async fn quit(&self) -> Result<()>;

    async fn find(&self, selector: &str) -> Result<ElementHandle> {
        self.find_optional(selector)
            .await?
            .ok_or_else(|| EnrollError::MissingElement {
                selector: selector.to_string(),
            })
    }

    async fn find_in(&self, scope: &ElementHandle, selector: &str) -> Result<ElementHandle> {
        self.find_optional_in(scope, selector)
            .await?
            .ok_or_else(|| EnrollError::MissingElement {
                selector: selector.to_string(),
            })
    }
}

/// Produces a ready-to-drive browser session for the requested engine.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    type Driver: BrowserDriver;

    async fn launch(&self, engine: BrowserEngine, headless: bool) -> Result<Self::Driver>;
}
