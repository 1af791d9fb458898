//! Match two records against each other

use super::CliError;
use crate::{MatchClassAd, parse_classad};

/// Outcome of matching a left and a right record.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub left_matches_right: bool,
    pub right_matches_left: bool,
    pub left_rank: Option<f64>,
    pub right_rank: Option<f64>,
}

impl MatchReport {
    pub fn matched(&self) -> bool {
        self.left_matches_right && self.right_matches_left
    }
}

pub fn execute_match(left: &str, right: &str) -> Result<MatchReport, CliError> {
    let left = parse_classad(left)?;
    let right = parse_classad(right)?;
    let pair = MatchClassAd::new(&left, &right);
    Ok(MatchReport {
        left_matches_right: pair.left_matches_right(),
        right_matches_left: pair.right_matches_left(),
        left_rank: pair.evaluate_rank_left(),
        right_rank: pair.evaluate_rank_right(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_sided_match() {
        let report = execute_match(
            "[Requirements = TARGET.Memory > 100; Rank = TARGET.Memory]",
            "[Memory = 64]",
        )
        .unwrap();
        assert!(!report.left_matches_right);
        assert!(!report.right_matches_left);
        assert!(!report.matched());
        assert_eq!(report.left_rank, Some(64.0));
        assert_eq!(report.right_rank, None);
    }
}
