//! Evaluate an expression against optional MY and TARGET records

use super::CliError;
use crate::{ClassAd, EvalContext, Evaluator, Value, parse, parse_classad};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expr: String,
    /// Record bound as MY; an empty record when absent
    pub my: Option<String>,
    /// Record bound as TARGET
    pub target: Option<String>,
}

pub fn execute_eval(options: &EvalOptions) -> Result<Value, CliError> {
    let expr = parse(&options.expr)?;
    let my = match &options.my {
        Some(text) => parse_classad(text)?,
        None => ClassAd::new(),
    };
    let target = options.target.as_deref().map(parse_classad).transpose()?;

    let ctx = match &target {
        Some(target) => EvalContext::with_target(&my, target),
        None => EvalContext::new(&my),
    };
    Ok(Evaluator::new().evaluate(&expr, &ctx))
}
