//! Configuration verification.
//!
//! Checks that the project has its `.env` files, that the critical variables
//! are set, and that the storefront would accept the configuration.

use std::collections::BTreeMap;
use std::path::Path;

use vitrina_storefront::config::StorefrontConfig;

use super::{CommandError, read_env_file};

/// Variables the storefront cannot start sensibly without.
pub const CRITICAL_VARS: [&str; 3] = ["APP_ENV", "APP_REGION", "API_BASE_URL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub label: String,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn new(label: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Outcome of every check, in the order they ran.
#[derive(Debug, Default)]
pub struct Report {
    pub checks: Vec<Check>,
}

impl Report {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed).count()
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run every check against the project at `root`.
#[must_use]
pub fn verify(root: &Path) -> Report {
    let mut report = Report::default();

    let env_path = root.join(".env");
    let example_path = root.join(".env.example");
    for path in [&env_path, &example_path] {
        let exists = path.is_file();
        report.checks.push(Check::new(
            "File",
            exists,
            path.display().to_string(),
        ));
    }

    if !env_path.is_file() {
        return report;
    }

    let vars = match read_env_file(&env_path) {
        Ok(vars) => vars,
        Err(e) => {
            report.checks.push(Check::new("Parse .env", false, e.to_string()));
            return report;
        }
    };

    for name in CRITICAL_VARS {
        let value = vars.get(name).filter(|value| !value.trim().is_empty());
        report.checks.push(Check::new(
            name,
            value.is_some(),
            value.map_or("not set", String::as_str),
        ));
    }

    report.checks.push(load_check(&vars));
    report
}

fn load_check(vars: &BTreeMap<String, String>) -> Check {
    match StorefrontConfig::from_lookup(|key| vars.get(key).cloned()) {
        Ok(config) => Check::new(
            "Storefront config",
            true,
            format!(
                "{} / {} ({}), mocks {}",
                config.environment,
                config.region,
                config.site_id(),
                if config.mock.enabled { "on" } else { "off" }
            ),
        ),
        Err(e) => Check::new("Storefront config", false, e.to_string()),
    }
}

/// Log the report and fail when any check failed.
///
/// # Errors
///
/// Returns `CommandError::VerificationFailed` with the number of failed checks.
pub fn run(root: &Path) -> Result<(), CommandError> {
    tracing::info!("Verifying configuration in {}", root.display());

    let report = verify(root);
    for check in &report.checks {
        let mark = if check.passed { "ok" } else { "FAIL" };
        tracing::info!("[{mark}] {}: {}", check.label, check.detail);
    }

    if report.passed() {
        tracing::info!("All checks passed");
        Ok(())
    } else {
        tracing::info!("Run `vitrina-cli env-switch <environment> [region]` to regenerate .env");
        Err(CommandError::VerificationFailed {
            failed: report.failed(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vitrina-verify-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_env_only_checks_files() {
        let dir = temp_dir();
        let report = verify(&dir);

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.failed(), 2);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_critical_variable_fails() {
        let dir = temp_dir();
        fs::write(dir.join(".env"), "APP_ENV=testing\nAPP_REGION=brazil\n").unwrap();
        fs::write(dir.join(".env.example"), "").unwrap();

        let report = verify(&dir);

        assert_eq!(report.failed(), 1);
        let failed = report.checks.iter().find(|check| !check.passed).unwrap();
        assert_eq!(failed.label, "API_BASE_URL");
        assert!(report.checks.last().unwrap().detail.contains("MLB"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_value_fails_config_load() {
        let dir = temp_dir();
        fs::write(
            dir.join(".env"),
            "APP_ENV=staging\nAPP_REGION=colombia\nAPI_BASE_URL=http://localhost\n",
        )
        .unwrap();
        fs::write(dir.join(".env.example"), "").unwrap();

        let report = verify(&dir);

        assert_eq!(report.failed(), 1);
        let last = report.checks.last().unwrap();
        assert!(!last.passed);
        assert!(last.detail.contains("APP_ENV"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_generated_env_passes() {
        let dir = temp_dir();
        super::super::env_switch::switch(
            vitrina_storefront::config::Environment::Testing,
            vitrina_storefront::config::Region::Argentina,
            &dir,
        )
        .unwrap();
        fs::write(dir.join(".env.example"), "").unwrap();

        let report = verify(&dir);

        assert!(report.passed(), "{report:?}");
        assert!(run(&dir).is_ok());

        fs::remove_dir_all(dir).unwrap();
    }
}
