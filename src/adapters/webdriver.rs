use crate::config::BrowserEngine;
use crate::domain::ports::{BrowserDriver, DriverLauncher, ElementHandle};
use crate::utils::error::{EnrollError, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.159 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36",
];

// W3C WebDriver element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn driver_binary(engine: BrowserEngine) -> &'static str {
    match engine {
        BrowserEngine::Chromium => "chromedriver",
        BrowserEngine::Firefox => "geckodriver",
    }
}

fn default_port(engine: BrowserEngine) -> u16 {
    match engine {
        BrowserEngine::Chromium => 9515,
        BrowserEngine::Firefox => 4444,
    }
}

fn capabilities(engine: BrowserEngine, headless: bool) -> Value {
    let user_agent = USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);

    match engine {
        BrowserEngine::Chromium => {
            let mut args: Vec<String> = [
                "--disable-blink-features=AutomationControlled",
                "--disable-extensions",
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-setuid-sandbox",
                "--disable-popup-blocking",
                "--disable-infobars",
                "--disable-notifications",
                "--disable-default-apps",
                "--mute-audio",
                "--blink-settings=imagesEnabled=false",
                "--remote-allow-origins=*",
            ]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
            args.push(format!("--user-agent={}", user_agent));
            if headless {
                args.push("--headless=new".to_string());
            }

            json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "chrome",
                        "pageLoadStrategy": "eager",
                        "goog:chromeOptions": { "args": args }
                    }
                }
            })
        }
        BrowserEngine::Firefox => {
            let mut args: Vec<String> = Vec::new();
            if headless {
                args.push("-headless".to_string());
            }

            json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "firefox",
                        "pageLoadStrategy": "eager",
                        "moz:firefoxOptions": {
                            "args": args,
                            "prefs": {
                                "permissions.default.desktop-notification": 2,
                                "permissions.default.image": 2,
                                "dom.push.enabled": false,
                                "dom.webnotifications.serviceworker.enabled": false,
                                "dom.webnotifications.enabled": false,
                                "general.useragent.override": user_agent
                            }
                        }
                    }
                }
            })
        }
    }
}

/// Spawns the engine's WebDriver binary and opens a session against it.
#[derive(Debug, Clone, Default)]
pub struct WebDriverLauncher {
    driver_port: Option<u16>,
    driver_path: Option<String>,
}

impl WebDriverLauncher {
    pub fn new(driver_port: Option<u16>, driver_path: Option<String>) -> Self {
        Self {
            driver_port,
            driver_path,
        }
    }
}

#[async_trait]
impl DriverLauncher for WebDriverLauncher {
    type Driver = WebDriverSession;

    async fn launch(&self, engine: BrowserEngine, headless: bool) -> Result<Self::Driver> {
        let driver = driver_binary(engine);
        let binary = self
            .driver_path
            .clone()
            .unwrap_or_else(|| driver.to_string());
        let port = self.driver_port.unwrap_or_else(|| default_port(engine));
        let base_url = format!("http://127.0.0.1:{}", port);

        tracing::debug!("Spawning {} on port {}", binary, port);
        let process = Command::new(&binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| EnrollError::DriverLaunch {
                engine,
                driver,
                reason: error.to_string(),
            })?;

        wait_until_ready(&base_url)
            .await
            .map_err(|error| EnrollError::DriverLaunch {
                engine,
                driver,
                reason: error.to_string(),
            })?;

        let session = WebDriverSession::open(&base_url, engine, headless)
            .await
            .map_err(|error| EnrollError::DriverLaunch {
                engine,
                driver,
                reason: error.to_string(),
            })?;

        Ok(session.with_process(process))
    }
}

async fn wait_until_ready(base_url: &str) -> Result<()> {
    let http = reqwest::Client::new();
    for _ in 0..40 {
        if let Ok(response) = http.get(format!("{}/status", base_url)).send().await {
            if let Ok(payload) = response.json::<Value>().await {
                if payload["value"]["ready"].as_bool().unwrap_or(false) {
                    return Ok(());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    Err(EnrollError::Driver {
        code: "timeout".to_string(),
        message: format!("driver at {} never reported ready", base_url),
    })
}

/// One W3C WebDriver session. Dropping the session kills the spawned driver
/// process, taking the browser with it.
#[derive(Debug)]
pub struct WebDriverSession {
    http: reqwest::Client,
    session_url: String,
    _process: Option<Child>,
}

impl WebDriverSession {
    /// Open a new session against a running WebDriver server.
    pub async fn open(base_url: &str, engine: BrowserEngine, headless: bool) -> Result<Self> {
        let http = reqwest::Client::new();
        let payload: Value = http
            .post(format!("{}/session", base_url))
            .json(&capabilities(engine, headless))
            .send()
            .await?
            .json()
            .await?;

        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        if let Some(code) = value.get("error").and_then(Value::as_str) {
            return Err(EnrollError::Driver {
                code: code.to_string(),
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| EnrollError::Driver {
                code: "session not created".to_string(),
                message: value.to_string(),
            })?;

        Ok(Self {
            session_url: format!("{}/session/{}", base_url, session_id),
            http,
            _process: None,
        })
    }

    fn with_process(mut self, process: Child) -> Self {
        self._process = Some(process);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.session_url, path)
    }

    async fn value_for(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let payload: Value = request.send().await?.json().await?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if let Some(code) = value.get("error").and_then(Value::as_str) {
            return Err(EnrollError::Driver {
                code: code.to_string(),
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        Ok(value)
    }

    async fn find_from(&self, url: String, selector: &str) -> Result<Option<ElementHandle>> {
        let body = json!({ "using": "css selector", "value": selector });
        match self.value_for(self.http.post(url).json(&body)).await {
            Ok(value) => Ok(Some(extract_element(&value)?)),
            Err(EnrollError::Driver { code, .. }) if code == "no such element" => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn find_all_from(&self, url: String, selector: &str) -> Result<Vec<ElementHandle>> {
        let body = json!({ "using": "css selector", "value": selector });
        let value = self.value_for(self.http.post(url).json(&body)).await?;

        value
            .as_array()
            .ok_or_else(|| protocol_error(&value))?
            .iter()
            .map(extract_element)
            .collect()
    }
}

fn extract_element(value: &Value) -> Result<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
        .ok_or_else(|| protocol_error(value))
}

fn protocol_error(value: &Value) -> EnrollError {
    EnrollError::Driver {
        code: "protocol error".to_string(),
        message: format!("unexpected response payload: {}", value),
    }
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.value_for(self.http.post(self.url("/url")).json(&json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.value_for(self.http.get(self.url("/url"))).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| protocol_error(&value))
    }

    async fn find_optional(&self, selector: &str) -> Result<Option<ElementHandle>> {
        self.find_from(self.url("/element"), selector).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.find_all_from(self.url("/elements"), selector).await
    }

    async fn find_optional_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        self.find_from(self.url(&format!("/element/{}/element", scope.0)), selector)
            .await
    }

    async fn find_all_in(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        self.find_all_from(self.url(&format!("/element/{}/elements", scope.0)), selector)
            .await
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.value_for(
            self.http
                .post(self.url(&format!("/element/{}/click", element.0)))
                .json(&json!({})),
        )
        .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.value_for(
            self.http
                .post(self.url(&format!("/element/{}/value", element.0)))
                .json(&json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let value = self
            .value_for(self.http.get(self.url(&format!("/element/{}/text", element.0))))
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| protocol_error(&value))
    }

    async fn attr(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let value = self
            .value_for(self.http.get(self.url(&format!(
                "/element/{}/attribute/{}",
                element.0, name
            ))))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        let value = self
            .value_for(
                self.http
                    .get(self.url(&format!("/element/{}/enabled", element.0))),
            )
            .await?;
        value.as_bool().ok_or_else(|| protocol_error(&value))
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool> {
        let value = self
            .value_for(
                self.http
                    .get(self.url(&format!("/element/{}/selected", element.0))),
            )
            .await?;
        value.as_bool().ok_or_else(|| protocol_error(&value))
    }

    async fn quit(&self) -> Result<()> {
        self.value_for(self.http.delete(self.session_url.clone()))
            .await?;
        Ok(())
    }
}
