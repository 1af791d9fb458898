//! Syntax checking of expressions and records

use super::CliError;
use crate::{ClassAd, Expr, parse, parse_classad};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The text to check
    pub text: String,
    /// Require a whole `[...]` record rather than any expression
    pub classad: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    Expression(Expr),
    ClassAd(ClassAd),
}

impl CheckResult {
    /// Canonical rendering of what was parsed.
    pub fn canonical(&self) -> String {
        match self {
            CheckResult::Expression(expr) => expr.to_string(),
            CheckResult::ClassAd(ad) => ad.to_string(),
        }
    }
}

pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.classad {
        Ok(CheckResult::ClassAd(parse_classad(&options.text)?))
    } else {
        Ok(CheckResult::Expression(parse(&options.text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_renders_canonical() {
        let options = CheckOptions {
            text: "a+b*2".to_string(),
            classad: false,
        };
        let result = execute_check(&options).unwrap();
        assert_eq!(result.canonical(), "(a + (b * 2))");
    }

    #[test]
    fn test_check_requires_record() {
        let options = CheckOptions {
            text: "1 + 2".to_string(),
            classad: true,
        };
        assert!(matches!(execute_check(&options), Err(CliError::Parse(_))));
    }
}
