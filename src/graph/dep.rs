// src/graph/dep.rs

//! Dependency expressions and the relational operator table
//!
//! A dependency is either a plain name, a name related to an EVR through one
//! of the fixed relational operators, or a rich boolean expression. Operator
//! tokens map through one explicit finite table; a token outside it fails the
//! lookup instead of being interpolated into a symbol name at first use.

use crate::error::{Error, Result};
use crate::evr::compare_evr;
use std::cmp::Ordering;
use std::fmt;

/// Relational operators understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
}

impl RelOp {
    /// Resolve a dependency-record `flags` token.
    ///
    /// The table is the complete operator vocabulary; anything else is
    /// rejected here, at the engine boundary, with the offending token named.
    pub fn from_flag(token: &str) -> Result<Self> {
        match token {
            "EQ" => Ok(RelOp::Eq),
            "LT" => Ok(RelOp::Lt),
            "GT" => Ok(RelOp::Gt),
            "LE" => Ok(RelOp::Le),
            "GE" => Ok(RelOp::Ge),
            "NE" => Ok(RelOp::Ne),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            RelOp::Eq => "=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
            RelOp::Ne => "!=",
        }
    }

    /// Evaluate `provided OP wanted` over EVR strings.
    ///
    /// `Le` and `Ge` are the disjunction of `Eq` with `Lt` / `Gt`; the other
    /// operators map one to one onto the comparison outcome.
    pub fn evaluate(&self, provided: &str, wanted: &str) -> bool {
        let ord = compare_evr(provided, wanted);
        match self {
            RelOp::Eq => ord == Ordering::Equal,
            RelOp::Lt => ord == Ordering::Less,
            RelOp::Gt => ord == Ordering::Greater,
            RelOp::Le => ord == Ordering::Equal || ord == Ordering::Less,
            RelOp::Ge => ord == Ordering::Equal || ord == Ordering::Greater,
            RelOp::Ne => ord != Ordering::Equal,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A compiled dependency expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dep {
    /// Any version of the named target
    Name(String),
    /// The named target, constrained against an EVR
    Rel { name: String, op: RelOp, evr: String },
    /// A rich boolean expression, parsed from its parenthesized string form
    Rich(RichDep),
}

impl Dep {
    pub fn rel(name: impl Into<String>, op: RelOp, evr: impl Into<String>) -> Self {
        Dep::Rel {
            name: name.into(),
            op,
            evr: evr.into(),
        }
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dep::Name(name) => f.write_str(name),
            Dep::Rel { name, op, evr } => write!(f, "{} {} {}", name, op, evr),
            Dep::Rich(rich) => write!(f, "{}", rich),
        }
    }
}

/// Boolean tree of a rich dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RichDep {
    Term(Box<Dep>),
    And(Box<RichDep>, Box<RichDep>),
    Or(Box<RichDep>, Box<RichDep>),
}

impl fmt::Display for RichDep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RichDep::Term(dep) => write!(f, "{}", dep),
            RichDep::And(a, b) => write!(f, "({} AND {})", a, b),
            RichDep::Or(a, b) => write!(f, "({} OR {})", a, b),
        }
    }
}

/// Parse a rich dependency string such as `(foo >= 1.0-3 AND bar != 0.9)`.
///
/// The string is fully self-contained: every other field of the originating
/// dependency record is ignored by the caller once the leading `(` has been
/// seen.
pub fn parse_rich_dep(input: &str) -> Result<RichDep> {
    let mut parser = RichParser {
        input,
        chars: input.char_indices().peekable(),
    };
    parser.skip_ws();
    let tree = parser.group()?;
    parser.skip_ws();
    if parser.chars.next().is_some() {
        return Err(parser.fail("trailing characters after expression"));
    }
    Ok(tree)
}

struct RichParser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> RichParser<'a> {
    fn fail(&self, reason: &str) -> Error {
        Error::RichDependency {
            input: self.input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// `'(' operand (BOOLOP operand)* ')'`, folded left to right.
    fn group(&mut self) -> Result<RichDep> {
        match self.chars.next() {
            Some((_, '(')) => {}
            _ => return Err(self.fail("expected '('")),
        }
        self.skip_ws();
        let mut tree = self.operand()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.chars.next();
                    return Ok(tree);
                }
                None => return Err(self.fail("unterminated group")),
                _ => {}
            }
            let word = self.word();
            let rhs = {
                self.skip_ws();
                self.operand()?
            };
            tree = if word.eq_ignore_ascii_case("and") {
                RichDep::And(Box::new(tree), Box::new(rhs))
            } else if word.eq_ignore_ascii_case("or") {
                RichDep::Or(Box::new(tree), Box::new(rhs))
            } else {
                return Err(self.fail(&format!("unsupported boolean operator '{}'", word)));
            };
        }
    }

    fn operand(&mut self) -> Result<RichDep> {
        if self.peek() == Some('(') {
            return self.group();
        }
        let name = self.word();
        if name.is_empty() {
            return Err(self.fail("expected a dependency name"));
        }
        self.skip_ws();
        match self.peek() {
            Some('<' | '>' | '=' | '!') => {
                let op = self.rel_op()?;
                self.skip_ws();
                let evr = self.word();
                if evr.is_empty() {
                    return Err(self.fail("relational operator without an EVR"));
                }
                Ok(RichDep::Term(Box::new(Dep::rel(name, op, evr))))
            }
            _ => Ok(RichDep::Term(Box::new(Dep::Name(name)))),
        }
    }

    fn rel_op(&mut self) -> Result<RelOp> {
        let first = self.chars.next().map(|(_, c)| c).unwrap_or_default();
        let eq_follows = self.peek() == Some('=');
        if eq_follows {
            self.chars.next();
        }
        match (first, eq_follows) {
            ('<', true) => Ok(RelOp::Le),
            ('<', false) => Ok(RelOp::Lt),
            ('>', true) => Ok(RelOp::Ge),
            ('>', false) => Ok(RelOp::Gt),
            ('=', _) => Ok(RelOp::Eq),
            ('!', true) => Ok(RelOp::Ne),
            _ => Err(self.fail(&format!("bad relational operator '{}'", first))),
        }
    }

    /// Consume up to the next whitespace, parenthesis, or operator start.
    fn word(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }
}
