use auto_turmas::utils::{logger, validation::Validate};
use auto_turmas::{events, EnrollmentEngine, EventLevel, RunRequest, WebDriverLauncher};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut request = RunRequest::parse();

    logger::init_cli_logger(request.verbose);

    tracing::info!("Starting auto-turmas");
    if request.verbose {
        // Credentials stay out of the log.
        tracing::debug!(
            "Run parameters: engine={} headless={} dry_run={} enrollment_index={} table={}",
            request.browser_engine,
            request.headless,
            request.dry_run,
            request.enrollment_index,
            request.table_path
        );
    }

    if request.login_password.is_none() {
        let password = rpassword::prompt_password("Portal password: ")?;
        request.login_password = Some(password);
    }

    if let Err(error) = request.validate() {
        tracing::error!("❌ Configuration validation failed: {}", error);
        std::process::exit(2);
    }

    let (sender, mut receiver) = events::channel();
    let launcher = WebDriverLauncher::new(request.driver_port, request.driver_path.clone());
    let engine = EnrollmentEngine::new(launcher, sender);

    let run_request = request.clone();
    let worker = tokio::spawn(async move { engine.run(&run_request).await });

    // The stream closes when the run is over; that is the completion signal.
    let mut failed = false;
    while let Some(event) = receiver.recv().await {
        match event.level {
            EventLevel::Info => tracing::info!("{}", event.message),
            EventLevel::Warning => tracing::warn!("{}", event.message),
            EventLevel::Error => {
                tracing::error!("❌ {}", event.message);
                failed = true;
            }
            EventLevel::Success => tracing::info!("✅ {}", event.message),
        }
    }

    worker.await?;

    if failed {
        std::process::exit(1);
    }

    tracing::info!("Run finished");
    Ok(())
}
