//! Environment switching.
//!
//! Writes a `.env` file holding every variable of the chosen environment
//! profile, so the storefront starts with exactly those settings. An existing
//! `.env` is copied to `.env.backup` first.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use vitrina_storefront::config::{Environment, Region};

use super::{CommandError, read_env_file};

/// Render the `.env` contents for an environment and region.
#[must_use]
pub fn render(environment: Environment, region: Region, generated_at: DateTime<Local>) -> String {
    let profile = environment.profile();
    let settings = region.settings();
    let mut out = String::new();

    let _ = writeln!(out, "# Environment: {environment}");
    let _ = writeln!(out, "# Region: {region} ({})", settings.site_id);
    let _ = writeln!(out, "# Generated {}", generated_at.format("%Y-%m-%d %H:%M:%S"));

    let sections: [(&str, Vec<(&str, String)>); 4] = [
        (
            "Environment",
            vec![
                ("APP_ENV", environment.to_string()),
                ("APP_REGION", region.to_string()),
            ],
        ),
        (
            "API",
            vec![
                ("API_BASE_URL", profile.api_base_url.to_string()),
                ("API_TIMEOUT_MS", profile.api_timeout.as_millis().to_string()),
            ],
        ),
        (
            "Features",
            vec![
                ("ENABLE_LOGGING", profile.enable_logging.to_string()),
                ("ENABLE_CACHE", profile.enable_cache.to_string()),
                ("CACHE_TTL_SECS", profile.cache_ttl.as_secs().to_string()),
                ("ENABLE_REVIEWS", profile.enable_reviews.to_string()),
                ("ENABLE_QUESTIONS", profile.enable_questions.to_string()),
                (
                    "ENABLE_RECOMMENDATIONS",
                    profile.enable_recommendations.to_string(),
                ),
            ],
        ),
        (
            "Fixtures",
            vec![
                ("USE_MOCK_DATA", profile.use_mock_data.to_string()),
                ("FALLBACK_TO_MOCK", "false".to_owned()),
                ("MOCK_DELAY_MS", profile.mock_delay.as_millis().to_string()),
                ("MOCK_ERROR_RATE", profile.mock_error_rate.to_string()),
                ("DEFAULT_LIMIT", profile.default_limit.to_string()),
            ],
        ),
    ];

    for (title, vars) in sections {
        let _ = writeln!(out, "\n# {title}");
        for (key, value) in vars {
            let _ = writeln!(out, "{key}={value}");
        }
    }

    out.push_str("\n# Optional\nAPI_AUTH_TOKEN=\nSENTRY_DSN=\n");
    out
}

/// Write `.env` into `dir`, backing up any existing file.
///
/// # Errors
///
/// Returns `CommandError::Io` if the backup or the new file cannot be written.
pub fn switch(environment: Environment, region: Region, dir: &Path) -> Result<PathBuf, CommandError> {
    tracing::info!("Creating .env for environment: {environment}, region: {region}");

    let env_path = dir.join(".env");
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CommandError::Io { path, source }
    };

    if env_path.exists() {
        let backup_path = dir.join(".env.backup");
        fs::copy(&env_path, &backup_path).map_err(io_error(&backup_path))?;
        tracing::info!("Backup created: {}", backup_path.display());
    }

    fs::write(&env_path, render(environment, region, Local::now())).map_err(io_error(&env_path))?;

    tracing::info!("Wrote {}", env_path.display());
    tracing::info!("Start the storefront with: cargo run -p vitrina-storefront");
    Ok(env_path)
}

/// Log the settings the current `.env` selects.
pub fn show_status(dir: &Path) {
    let env_path = dir.join(".env");
    if !env_path.exists() {
        tracing::info!("No .env file in {}", dir.display());
        return;
    }

    match read_env_file(&env_path) {
        Ok(vars) => {
            tracing::info!("Current configuration:");
            for key in ["APP_ENV", "APP_REGION", "USE_MOCK_DATA", "ENABLE_LOGGING"] {
                let value = vars.get(key).map_or("(not set)", String::as_str);
                tracing::info!("  {key}: {value}");
            }
        }
        Err(e) => tracing::warn!("{e}"),
    }
}
