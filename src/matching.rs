//! Symmetric matching of two records.

use tracing::debug;

use crate::{
    classad::ClassAd,
    evaluator::{EvalContext, Evaluator},
    limits::EvalLimits,
    value::Value,
};

/// Attribute each side must satisfy for a match.
pub const REQUIREMENTS: &str = "Requirements";

/// Attribute scoring the other side, for ordering candidates.
pub const RANK: &str = "Rank";

/// Two records bound as each other's TARGET.
///
/// Neither record is copied: the match borrows both, and replacing one side
/// swaps only that borrow.
///
/// # Examples
///
/// ```
/// use classad::{ClassAd, MatchClassAd};
///
/// let job: ClassAd = "[Cpus = 2; Requirements = TARGET.Cpus >= MY.Cpus]".parse().unwrap();
/// let machine: ClassAd = "[Cpus = 4; Requirements = TARGET.Cpus <= 4]".parse().unwrap();
///
/// let pair = MatchClassAd::new(&job, &machine);
/// assert!(pair.matches());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MatchClassAd<'a> {
    left: &'a ClassAd,
    right: &'a ClassAd,
    limits: EvalLimits,
}

impl<'a> MatchClassAd<'a> {
    pub fn new(left: &'a ClassAd, right: &'a ClassAd) -> Self {
        MatchClassAd {
            left,
            right,
            limits: EvalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn left(&self) -> &'a ClassAd {
        self.left
    }

    pub fn right(&self) -> &'a ClassAd {
        self.right
    }

    pub fn replace_left(&mut self, left: &'a ClassAd) {
        self.left = left;
    }

    pub fn replace_right(&mut self, right: &'a ClassAd) {
        self.right = right;
    }

    fn evaluate(&self, my: &ClassAd, target: &ClassAd, name: &str) -> Value {
        Evaluator::new()
            .with_limits(self.limits)
            .evaluate_attribute(name, &EvalContext::with_target(my, target))
    }

    /// The left side's Requirements, evaluated against the right side.
    pub fn left_matches_right(&self) -> bool {
        self.evaluate(self.left, self.right, REQUIREMENTS) == Value::Boolean(true)
    }

    /// The right side's Requirements, evaluated against the left side.
    pub fn right_matches_left(&self) -> bool {
        self.evaluate(self.right, self.left, REQUIREMENTS) == Value::Boolean(true)
    }

    /// True only when both sides' Requirements are `true`. Undefined, Error
    /// or any non-boolean result on either side rejects the pair.
    pub fn matches(&self) -> bool {
        let left = self.evaluate(self.left, self.right, REQUIREMENTS);
        let right = self.evaluate(self.right, self.left, REQUIREMENTS);
        let matched = left == Value::Boolean(true) && right == Value::Boolean(true);
        debug!(left = %left, right = %right, matched, "evaluated match requirements");
        matched
    }

    /// The left side's Rank against the right side, as a real.
    pub fn evaluate_rank_left(&self) -> Option<f64> {
        self.evaluate(self.left, self.right, RANK).as_real()
    }

    /// The right side's Rank against the left side, as a real.
    pub fn evaluate_rank_right(&self) -> Option<f64> {
        self.evaluate(self.right, self.left, RANK).as_real()
    }
}
