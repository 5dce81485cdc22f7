use crate::utils::error::Result;
use crate::utils::validation::{
    self, validate_file_extension, validate_minimum, validate_non_empty_string, validate_url,
};
use clap::{Parser, ValueEnum};

pub const DEFAULT_PORTAL: &str = "https://inforestudante.uc.pt";

/// Table formats the loader understands.
pub const TABLE_EXTENSIONS: &[&str] = &["csv", "xlsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrowserEngine {
    Chromium,
    Firefox,
}

impl std::fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserEngine::Chromium => f.write_str("chromium"),
            BrowserEngine::Firefox => f.write_str("firefox"),
        }
    }
}

/// Everything one run needs, fixed up front. The worker owns a copy for the
/// lifetime of the run; nothing here is mutated once the run starts.
#[derive(Debug, Clone, Parser)]
#[command(name = "auto-turmas")]
#[command(about = "Automated timetable enrollment on the university portal")]
pub struct RunRequest {
    /// Portal login email.
    #[arg(long)]
    pub login_email: String,

    /// Portal login password. Prompted for interactively when neither the
    /// flag nor the environment variable is set.
    #[arg(long, env = "AUTO_TURMAS_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,

    /// Browser to drive.
    #[arg(long, value_enum, default_value_t = BrowserEngine::Chromium)]
    pub browser_engine: BrowserEngine,

    /// Run the browser without a visible window.
    #[arg(long)]
    pub headless: bool,

    /// Walk the full selection flow but commit nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// 1-based row in the portal's enrollment-track listing.
    #[arg(long, default_value = "1")]
    pub enrollment_index: u32,

    /// Preference table file (.csv or .xlsx).
    #[arg(long)]
    pub table_path: String,

    /// Portal base URL.
    #[arg(long, default_value = DEFAULT_PORTAL)]
    pub portal: String,

    /// Port for the browser driver; defaults to the engine's usual port.
    #[arg(long)]
    pub driver_port: Option<u16>,

    /// Explicit path to the chromedriver/geckodriver binary.
    #[arg(long)]
    pub driver_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl RunRequest {
    pub fn login_url(&self) -> String {
        format!("{}/nonio/security/login.do", self.base())
    }

    pub fn enroll_url(&self) -> String {
        format!("{}/nonio/inscturmas/init.do", self.base())
    }

    fn base(&self) -> &str {
        self.portal.trim_end_matches('/')
    }
}

impl validation::Validate for RunRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("login_email", &self.login_email)?;
        validate_non_empty_string("table_path", &self.table_path)?;
        validate_file_extension("table_path", &self.table_path, TABLE_EXTENSIONS)?;
        validate_minimum("enrollment_index", self.enrollment_index, 1)?;
        validate_url("portal", &self.portal)?;
        Ok(())
    }
}
