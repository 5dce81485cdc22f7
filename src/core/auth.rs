use crate::domain::events::EventSender;
use crate::domain::ports::BrowserDriver;
use crate::utils::error::{EnrollError, Result};

const USERNAME_INPUT: &str = "input#username";
const PASSWORD_INPUT: &str = "input#password1";
const SUBMIT_BUTTON: &str = "input[type='submit']";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

/// Single-attempt login. A credential failure is a user-fixable
/// configuration error, not a transient fault, so `Failed` is terminal.
#[derive(Debug)]
pub struct AuthSession {
    state: AuthState,
}

impl AuthSession {
    pub fn new() -> Self {
        Self {
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Navigate to the login page and authenticate. When the portal redirects
    /// away from the login URL an existing session is still valid and no
    /// credentials are submitted.
    pub async fn login<D: BrowserDriver>(
        &mut self,
        driver: &D,
        events: &EventSender,
        login_url: &str,
        email: &str,
        password: &str,
    ) -> Result<()> {
        self.state = AuthState::Authenticating;

        events.info(format!("Navigating to {}", login_url));
        driver.navigate(login_url).await?;

        if driver.current_url().await? != login_url {
            events.info("Already logged in");
            self.state = AuthState::Authenticated;
            return Ok(());
        }

        let username_input = driver.find(USERNAME_INPUT).await?;
        let password_input = driver.find(PASSWORD_INPUT).await?;
        driver.send_keys(&username_input, email).await?;
        driver.send_keys(&password_input, password).await?;
        events.info("Filled login form");

        let login_button = driver.find(SUBMIT_BUTTON).await?;
        driver.click(&login_button).await?;
        events.info("Clicked login button");

        if driver.current_url().await? == login_url {
            self.state = AuthState::Failed;
            return Err(EnrollError::Authentication);
        }

        events.info("Login successful");
        self.state = AuthState::Authenticated;
        Ok(())
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
