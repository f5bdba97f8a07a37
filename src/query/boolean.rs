//! Boolean query parsing and evaluation.
//!
//! Grammar: terms and quoted phrases combined with case-sensitive `AND`,
//! `OR`, `NOT` and parentheses; precedence `NOT` > `AND` > `OR`, left
//! associative. Parsing builds an expression tree before any evaluation
//! because precedence and parentheses require structure. Evaluation
//! combines postings lists over the immutable index package: `AND` is set
//! intersection, `OR` set union, `NOT` difference against the universe of
//! all document ids.

use ahash::AHashSet;

use crate::document::DocId;
use crate::error::{CallunaError, Result};
use crate::index::package::{IndexPackage, TermKey};

/// A parsed boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanExpr {
    /// A single term.
    Term(String),
    /// A quoted phrase: the terms must occur contiguously in order.
    Phrase(Vec<String>),
    /// Complement against the universe of all document ids.
    Not(Box<BooleanExpr>),
    /// Set intersection.
    And(Box<BooleanExpr>, Box<BooleanExpr>),
    /// Set union.
    Or(Box<BooleanExpr>, Box<BooleanExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Term(String),
    Phrase(Vec<String>),
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ch if ch.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                if end == chars.len() {
                    return Err(CallunaError::parse("unmatched quote in boolean query"));
                }
                let inside: String = chars[start..end].iter().collect();
                let words: Vec<String> =
                    inside.split_whitespace().map(str::to_string).collect();
                match words.len() {
                    0 => return Err(CallunaError::parse("empty quoted phrase")),
                    1 => tokens.push(Token::Term(words.into_iter().next().unwrap())),
                    _ => tokens.push(Token::Phrase(words)),
                }
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '(' | ')' | '"')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    "NOT" => tokens.push(Token::Not),
                    _ => tokens.push(Token::Term(word)),
                }
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // or_expr := and_expr ( "OR" and_expr )*
    fn parse_or(&mut self) -> Result<BooleanExpr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = BooleanExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // and_expr := not_expr ( "AND" not_expr )*
    fn parse_and(&mut self) -> Result<BooleanExpr> {
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = BooleanExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // not_expr := "NOT" not_expr | primary
    fn parse_not(&mut self) -> Result<BooleanExpr> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(BooleanExpr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    // primary := "(" or_expr ")" | term | phrase
    fn parse_primary(&mut self) -> Result<BooleanExpr> {
        match self.advance() {
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(CallunaError::parse("expected closing parenthesis")),
                }
            }
            Some(Token::Term(term)) => Ok(BooleanExpr::Term(term)),
            Some(Token::Phrase(words)) => Ok(BooleanExpr::Phrase(words)),
            Some(tok) => Err(CallunaError::parse(format!(
                "expected operand, found {tok:?}"
            ))),
            None => Err(CallunaError::parse("missing operand")),
        }
    }
}

/// Parse a boolean query string into an expression tree.
pub fn parse_boolean_query(query: &str) -> Result<BooleanExpr> {
    let tokens = tokenize(query)?;
    if tokens.is_empty() {
        return Err(CallunaError::parse("empty boolean query"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(CallunaError::parse(format!(
            "unexpected token after expression: {:?}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}

/// Evaluate an expression tree against the index package.
pub fn evaluate(expr: &BooleanExpr, package: &IndexPackage) -> AHashSet<DocId> {
    match expr {
        BooleanExpr::Term(term) => package
            .posting_list(&TermKey::term(term.clone()))
            .iter()
            .copied()
            .collect(),
        BooleanExpr::Phrase(words) => phrase_docs(words, package),
        BooleanExpr::Not(inner) => {
            let inner_docs = evaluate(inner, package);
            package
                .all_doc_ids()
                .iter()
                .copied()
                .filter(|id| !inner_docs.contains(id))
                .collect()
        }
        BooleanExpr::And(left, right) => {
            let left_docs = evaluate(left, package);
            let right_docs = evaluate(right, package);
            left_docs.intersection(&right_docs).copied().collect()
        }
        BooleanExpr::Or(left, right) => {
            let left_docs = evaluate(left, package);
            let right_docs = evaluate(right, package);
            left_docs.union(&right_docs).copied().collect()
        }
    }
}

/// Documents containing `words` as a contiguous phrase.
///
/// A phrase within the indexed token n-gram depth is a single dictionary
/// lookup. Longer phrases fall back to intersecting the unigram postings
/// and confirming adjacency through the position lists.
pub(crate) fn phrase_docs(words: &[String], package: &IndexPackage) -> AHashSet<DocId> {
    if words.len() <= package.token_ngram_max() {
        let key = TermKey::phrase(words.iter().cloned());
        return package.posting_list(&key).iter().copied().collect();
    }

    let mut candidates: Option<AHashSet<DocId>> = None;
    for word in words {
        let docs: AHashSet<DocId> = package
            .posting_list(&TermKey::term(word.clone()))
            .iter()
            .copied()
            .collect();
        candidates = Some(match candidates {
            None => docs,
            Some(prev) => prev.intersection(&docs).copied().collect(),
        });
        if candidates.as_ref().is_some_and(|c| c.is_empty()) {
            return AHashSet::new();
        }
    }

    let keys: Vec<TermKey> = words.iter().map(|w| TermKey::term(w.clone())).collect();
    candidates
        .unwrap_or_default()
        .into_iter()
        .filter(|&doc_id| {
            package
                .term_positions(&keys[0], doc_id)
                .iter()
                .any(|&start| {
                    keys.iter().enumerate().skip(1).all(|(offset, key)| {
                        package
                            .term_positions(key, doc_id)
                            .binary_search(&(start + offset as u32))
                            .is_ok()
                    })
                })
        })
        .collect()
}

/// Parse and evaluate a boolean query in one step.
pub fn process_boolean_query(query: &str, package: &IndexPackage) -> Result<AHashSet<DocId>> {
    let expr = parse_boolean_query(query)?;
    Ok(evaluate(&expr, package))
}
