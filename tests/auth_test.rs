mod common;

use auto_turmas::core::auth::{AuthSession, AuthState};
use auto_turmas::utils::error::EnrollError;
use auto_turmas::{events, BrowserEngine, EnrollmentEngine, EventLevel, RunRequest};
use common::{FakeElement, FakePortal};
use tempfile::TempDir;

const LOGIN_URL: &str = "https://portal.test/nonio/security/login.do";
const ENROLL_URL: &str = "https://portal.test/nonio/inscturmas/init.do";
const HOME_URL: &str = "https://portal.test/home";

fn login_portal() -> FakePortal {
    let portal = FakePortal::new();
    portal.insert_element("login.user", FakeElement::default());
    portal.insert_element("login.pass", FakeElement::default());
    portal.insert_element("login.submit", FakeElement::default());
    portal.page_query(LOGIN_URL, "input#username", &["login.user"]);
    portal.page_query(LOGIN_URL, "input#password1", &["login.pass"]);
    portal.page_query(LOGIN_URL, "input[type='submit']", &["login.submit"]);
    portal
}

#[tokio::test]
async fn test_existing_session_skips_credential_submission() {
    let portal = FakePortal::new();
    portal.redirect_on_navigate(LOGIN_URL, HOME_URL);
    let (sender, mut receiver) = events::channel();

    let mut auth = AuthSession::new();
    auth.login(&portal.driver(), &sender, LOGIN_URL, "a@b.c", "pw")
        .await
        .unwrap();

    assert_eq!(auth.state(), AuthState::Authenticated);
    assert!(portal.typed().is_empty());
    assert!(portal.clicks().is_empty());

    drop(sender);
    let mut messages = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        messages.push(event.message);
    }
    assert!(messages.iter().any(|message| message == "Already logged in"));
}

#[tokio::test]
async fn test_successful_login_fills_and_submits() {
    let portal = login_portal();
    portal.redirect_on_click("login.submit", HOME_URL);
    let (sender, _receiver) = events::channel();

    let mut auth = AuthSession::new();
    auth.login(
        &portal.driver(),
        &sender,
        LOGIN_URL,
        "student@example.edu",
        "hunter2",
    )
    .await
    .unwrap();

    assert_eq!(auth.state(), AuthState::Authenticated);
    let typed = portal.typed();
    assert_eq!(typed.get("login.user").unwrap(), "student@example.edu");
    assert_eq!(typed.get("login.pass").unwrap(), "hunter2");
    assert_eq!(portal.clicks(), vec!["login.submit".to_string()]);
}

#[tokio::test]
async fn test_failed_login_is_terminal() {
    // No redirect on submit: the portal bounces back to the login page.
    let portal = login_portal();
    let (sender, _receiver) = events::channel();

    let mut auth = AuthSession::new();
    let outcome = auth
        .login(&portal.driver(), &sender, LOGIN_URL, "a@b.c", "wrong")
        .await;

    assert!(matches!(outcome, Err(EnrollError::Authentication)));
    assert_eq!(auth.state(), AuthState::Failed);
}

#[tokio::test]
async fn test_engine_stops_before_enrollment_listing_on_auth_failure() {
    let portal = login_portal();
    let launcher = portal.launcher();

    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("prefs.csv");
    std::fs::write(&table_path, "Class,PL,TP,T\n101,1,,\n").unwrap();

    let request = RunRequest {
        login_email: "a@b.c".to_string(),
        login_password: Some("wrong".to_string()),
        browser_engine: BrowserEngine::Chromium,
        headless: true,
        dry_run: false,
        enrollment_index: 1,
        table_path: table_path.to_str().unwrap().to_string(),
        portal: "https://portal.test".to_string(),
        driver_port: None,
        driver_path: None,
        verbose: false,
    };

    let (sender, mut receiver) = events::channel();
    let engine = EnrollmentEngine::new(launcher, sender);
    engine.run(&request).await;
    drop(engine);

    let mut errors = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        if event.level == EventLevel::Error {
            errors.push(event.message);
        }
    }
    assert_eq!(errors, vec!["Login failed, check your credentials".to_string()]);

    // The run never reaches the enrollment listing.
    assert!(!portal.navigations().contains(&ENROLL_URL.to_string()));
}
