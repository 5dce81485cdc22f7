use crate::config::RunRequest;
use crate::core::auth::AuthSession;
use crate::core::outcome::OutcomeRecorder;
use crate::core::selector::SlotSelector;
use crate::core::{navigator, prefs, table};
use crate::domain::events::EventSender;
use crate::domain::model::ClassPreference;
use crate::domain::ports::{BrowserDriver, DriverLauncher};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;

/// Owns one enrollment run end to end: table, preference index, browser
/// session, targets and picks all live inside a single call.
pub struct EnrollmentEngine<L: DriverLauncher> {
    launcher: L,
    events: EventSender,
}

impl<L: DriverLauncher> EnrollmentEngine<L> {
    pub fn new(launcher: L, events: EventSender) -> Self {
        Self { launcher, events }
    }

    /// Run one enrollment. Any failure is caught here and surfaced as a
    /// single Error event carrying the structured cause. Picks already
    /// committed to the live session before a failure stay committed; the
    /// run is still reported failed.
    pub async fn run(&self, request: &RunRequest) {
        if let Err(error) = self.try_run(request).await {
            self.events.error(error.to_string());
        }
    }

    async fn try_run(&self, request: &RunRequest) -> Result<()> {
        let password =
            validate_required_field("login_password", &request.login_password)?.clone();

        // Table problems must surface before any browser is launched.
        self.events
            .info(format!("Reading preference table {}", request.table_path));
        let (records, headers) = table::load_table(&request.table_path)?;
        let index = prefs::build_index(&records, &headers);
        self.events
            .info(format!("Indexed preferences for {} classes", index.len()));

        let driver = self
            .launcher
            .launch(request.browser_engine, request.headless)
            .await?;
        self.events
            .info(format!("{} browser initialized", request.browser_engine));

        let outcome = self.drive(&driver, request, &password, &index).await;

        if let Err(quit_error) = driver.quit().await {
            tracing::debug!("Browser session did not shut down cleanly: {}", quit_error);
        }

        outcome
    }

    async fn drive(
        &self,
        driver: &L::Driver,
        request: &RunRequest,
        password: &str,
        index: &[ClassPreference],
    ) -> Result<()> {
        let mut auth = AuthSession::new();
        auth.login(
            driver,
            &self.events,
            &request.login_url(),
            &request.login_email,
            password,
        )
        .await?;

        navigator::open_track(
            driver,
            &self.events,
            &request.enroll_url(),
            request.enrollment_index,
        )
        .await?;
        let matched = navigator::match_classes(driver, &self.events, index).await?;

        let selector = SlotSelector::new(request.dry_run);
        let mut recorder = OutcomeRecorder::new();
        for (target, preference) in &matched {
            selector
                .enroll_class(driver, &self.events, target, preference, &mut recorder)
                .await?;
        }

        recorder.summarize(&self.events);
        Ok(())
    }
}
