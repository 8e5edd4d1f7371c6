//! Environment configuration helpers

use std::path::PathBuf;

/// Load variables from a `.env` file in the current directory or its parents
///
/// Variables already present in the process environment win. Returns the path
/// of the file that was loaded, if any.
pub fn load_env() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Read an environment variable, treating blank values as unset
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_blank_is_unset() {
        unsafe {
            std::env::set_var("FINANCE_UTILS_TEST_BLANK", "  ");
            std::env::set_var("FINANCE_UTILS_TEST_SET", " value ");
        }
        assert_eq!(env_var("FINANCE_UTILS_TEST_BLANK"), None);
        assert_eq!(env_var("FINANCE_UTILS_TEST_SET").as_deref(), Some("value"));
        assert_eq!(env_var("FINANCE_UTILS_TEST_MISSING"), None);
        unsafe {
            std::env::remove_var("FINANCE_UTILS_TEST_BLANK");
            std::env::remove_var("FINANCE_UTILS_TEST_SET");
        }
    }
}
