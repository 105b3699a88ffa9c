//! Utility functions for fitctl
//!
//! Small helpers shared by the command handlers and the flows.

use anyhow::Result;
use std::path::PathBuf;

use fitfuel_common::ConsoleError;

/// Expand shell-style paths like ~ and environment variables
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Validate email format: a non-empty local part, one `@`, a non-empty domain
pub fn validate_email(email: &str) -> fitfuel_common::Result<()> {
    let invalid = || ConsoleError::invalid_input(format!("invalid email address: {}", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(())
}

/// Parse key=value pairs from command line, keeping their order
pub fn parse_key_value_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => anyhow::bail!("Invalid key=value pair: {}", pair),
        })
        .collect()
}

/// Confirm dangerous operation
pub fn confirm_operation(message: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    use dialoguer::Confirm;
    Ok(Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a@x").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_parse_key_value_pairs() {
        let pairs = vec!["b=2".to_string(), "a=x=y".to_string()];
        let result = parse_key_value_pairs(&pairs).unwrap();
        assert_eq!(
            result,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "x=y".to_string())
            ]
        );

        assert!(parse_key_value_pairs(&["invalid_pair".to_string()]).is_err());
        assert!(parse_key_value_pairs(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_expand_path_env() {
        std::env::set_var("FITCTL_TEST_DIR", "/tmp/fitctl");
        assert_eq!(
            expand_path("$FITCTL_TEST_DIR/session.json").unwrap(),
            PathBuf::from("/tmp/fitctl/session.json")
        );
    }

    #[test]
    fn test_confirm_forced() {
        assert!(confirm_operation("Delete?", true).unwrap());
    }
}
