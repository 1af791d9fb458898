//! Conversion from the unbracketed ("old") ClassAd format.
//!
//! Old ClassAds are written one `name = expression` per line, with a blank
//! line between records:
//!
//! ```text
//! MyType = "Job"
//! Cpus = 2
//!
//! MyType = "Machine"
//! ```
//!
//! Conversion is line based. Block-comment state wins over record
//! separation: a line that starts inside a `/* ... */` comment, whether it
//! opened at the start of a line or after an expression, never ends a record,
//! even when blank. Outside a comment a blank line ends the record. Lines
//! holding only comments are copied as is, and a line with any code outside
//! comments must be an assignment. The `;` separating it from the previous
//! attribute goes where its code starts, after any leading comment.

use thiserror::Error;

use crate::{
    classad::ClassAd,
    parser::{self, ParseError},
};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("line {line}: expected 'name = expression'")]
    MissingAssignment { line: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// What one old-format line holds outside of comments.
#[derive(Debug, PartialEq)]
struct LineScan {
    /// Byte offset of the first character that is not whitespace or comment
    code_start: Option<usize>,
    /// Whether that code contains `=` outside string literals
    assigns: bool,
    /// Block-comment state at the end of the line
    in_comment: bool,
}

/// Scans `line`, starting inside a block comment if `in_comment`. String
/// literals are skipped so `"/*"` opens nothing.
fn scan_line(line: &str, mut in_comment: bool) -> LineScan {
    let mut code_start = None;
    let mut assigns = false;
    let mut chars = line.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        if in_comment {
            if c == '*' && next == Some('/') {
                chars.next();
                in_comment = false;
            }
            continue;
        }
        match c {
            '/' if next == Some('/') => break,
            '/' if next == Some('*') => {
                chars.next();
                in_comment = true;
            }
            c if c.is_whitespace() => {}
            c => {
                code_start.get_or_insert(at);
                match c {
                    '"' | '\'' => {
                        while let Some((_, s)) = chars.next() {
                            if s == '\\' {
                                chars.next();
                            } else if s == c {
                                break;
                            }
                        }
                    }
                    '=' => assigns = true,
                    _ => {}
                }
            }
        }
    }

    LineScan {
        code_start,
        assigns,
        in_comment,
    }
}

/// Lines of one record under construction.
#[derive(Default)]
struct Record {
    lines: Vec<String>,
    attributes: usize,
}

impl Record {
    /// Adds an assignment line. Every attribute after the first is separated
    /// by a `;` placed where its code starts, after any leading comment.
    fn push_attribute(&mut self, line: &str, code_start: usize) {
        if self.attributes > 0 {
            let (comment, code) = line.split_at(code_start);
            self.lines.push(format!("{comment};{code}"));
        } else {
            self.lines.push(line.to_string());
        }
        self.attributes += 1;
    }

    fn render(&self) -> String {
        format!("[\n{}\n]", self.lines.join("\n"))
    }
}

/// Splits old-format text into bracketed record texts.
fn convert_records(text: &str) -> Result<Vec<String>, ConvertError> {
    let mut records = vec![];
    let mut current = Record::default();
    let mut in_comment = false;

    for (index, line) in text.lines().enumerate() {
        let scan = scan_line(line, in_comment);

        match scan.code_start {
            None if !in_comment && line.trim().is_empty() => {
                if current.attributes > 0 {
                    records.push(current.render());
                    current = Record::default();
                }
            }
            None => current.lines.push(line.to_string()),
            Some(_) if !scan.assigns => {
                return Err(ConvertError::MissingAssignment { line: index + 1 });
            }
            Some(at) => current.push_attribute(line, at),
        }

        in_comment = scan.in_comment;
    }

    if current.attributes > 0 {
        records.push(current.render());
    }
    Ok(records)
}

/// Rewrites old-format text as bracketed records, one per blank-line
/// separated block.
///
/// ```
/// use classad::convert::old_to_new;
///
/// let text = "A = 1\nB = A + 1\n\nC = 3\n";
/// assert_eq!(old_to_new(text).unwrap(), "[\nA = 1\n;B = A + 1\n]\n[\nC = 3\n]\n");
/// ```
pub fn old_to_new(text: &str) -> Result<String, ConvertError> {
    let mut out = String::new();
    for record in convert_records(text)? {
        out.push_str(&record);
        out.push('\n');
    }
    Ok(out)
}

/// Parses every record of old-format text.
pub fn parse_old(text: &str) -> Result<Vec<ClassAd>, ConvertError> {
    convert_records(text)?
        .iter()
        .map(|record| parser::parse_classad(record).map_err(ConvertError::from))
        .collect()
}
