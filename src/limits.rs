/// Depth limits that keep adversarial or accidentally cyclic input from
/// exhausting the stack.
///
/// Real records nest a handful of levels; the nesting defaults leave two
/// orders of magnitude of headroom while fitting a 2 MiB thread stack in an
/// unoptimized build. Operator chains such as a long `||` of alternatives are
/// flat rather than nested, and have their own, larger budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum number of nested expression evaluations, counting attribute
    /// resolution and `eval()` re-entry. Links of a left-nested operator
    /// chain are evaluated in a loop and do not count.
    pub max_depth: usize,

    /// Maximum recursive-descent nesting while parsing
    pub max_parse_depth: usize,

    /// Maximum number of binary operator and postfix links on any one path
    /// through a parsed expression
    pub max_chain_links: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_parse_depth: 128,
            max_chain_links: 1024,
        }
    }
}

impl EvalLimits {
    /// Create a new EvalLimits with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_parse_depth(mut self, max_parse_depth: usize) -> Self {
        self.max_parse_depth = max_parse_depth;
        self
    }

    pub fn with_max_chain_links(mut self, max_chain_links: usize) -> Self {
        self.max_chain_links = max_chain_links;
        self
    }
}
