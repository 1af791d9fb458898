pub mod ast;
pub mod classad;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod evaluator;
pub mod lexer;
pub mod limits;
pub mod matching;
pub mod output;
pub mod parser;
pub mod reader;
pub mod value;

pub use ast::{BinOp, Expr, Scope, Token, UnaryOp};
pub use classad::ClassAd;
pub use convert::{ConvertError, old_to_new, parse_old};
pub use evaluator::{EvalContext, EvalError, Evaluator};
pub use lexer::{LexError, LexErrorKind, Lexer, Position};
pub use limits::EvalLimits;
pub use matching::MatchClassAd;
pub use output::{to_classad_pretty, to_old_format};
pub use parser::{ParseError, Parser, parse, parse_classad, parse_expr};
pub use reader::ClassAdReader;
pub use value::Value;
