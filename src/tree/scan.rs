//! Bracket- and keyword-aware scanning primitives.
//!
//! Both scanners track nesting with a stack over the pairs `()`, `{}`,
//! `[]`, `<>` and the keyword pair `CASE…END`, and only honor stop tokens
//! at nesting depth zero. They are tolerant: a bracket mismatch records a
//! structural error and ends the scan with whatever was collected, it
//! never aborts the build.

use crate::error::StructureError;
use crate::lexer::Token;

use super::node::TokenSpan;

/// Bracket pairs, opener first. `CASE…END` nests like a bracket so that a
/// stop keyword inside a CASE expression does not end an enclosing scan.
const PAIRS: &[(&str, &str)] = &[
    ("(", ")"),
    ("{", "}"),
    ("[", "]"),
    ("<", ">"),
    ("CASE", "END"),
];

fn opener_index(token: &Token) -> Option<usize> {
    PAIRS.iter().position(|(open, _)| token.matches(open))
}

fn closer_index(token: &Token) -> Option<usize> {
    PAIRS.iter().position(|(_, close)| token.matches(close))
}

fn in_stops(token: &Token, stops: &[&str]) -> bool {
    stops.iter().any(|stop| token.matches(stop))
}

/// Scan forward from `*pos` within `..end`, collecting tokens up to (not
/// including) the first depth-zero stop token. `*pos` is left on the stop
/// token, on the offending bracket after a mismatch, or at `end`.
pub(crate) fn consume_until(
    tokens: &[Token],
    pos: &mut usize,
    end: usize,
    stops: &[&str],
    errors: &mut Vec<StructureError>,
) -> TokenSpan {
    let start = *pos;
    let mut stack: Vec<usize> = Vec::new();

    while *pos < end {
        let token = &tokens[*pos];

        if let Some(pair) = opener_index(token) {
            stack.push(pair);
        } else if let Some(pair) = closer_index(token) {
            match stack.last() {
                None => {
                    if in_stops(token, stops) {
                        break;
                    }
                    errors.push(StructureError::UnexpectedBracket {
                        bracket: token.text.clone(),
                        position: Some(token.position),
                    });
                    return TokenSpan { start, end: *pos };
                }
                Some(&top) if top == pair => {
                    stack.pop();
                }
                Some(_) => {
                    errors.push(StructureError::UnexpectedBracket {
                        bracket: token.text.clone(),
                        position: Some(token.position),
                    });
                    return TokenSpan { start, end: *pos };
                }
            }
        } else if stack.is_empty() && in_stops(token, stops) {
            break;
        }

        *pos += 1;
    }

    if let Some(&pair) = stack.last() {
        errors.push(StructureError::UnclosedBracket {
            bracket: PAIRS[pair].0.to_string(),
            position: tokens.get(*pos).map(|t| t.position),
        });
    }

    TokenSpan { start, end: *pos }
}

/// Scan backwards from the end of `span`, peeling tokens off it until a
/// depth-zero stop token (not included in the result). Consumed tokens are
/// removed from `span` by shrinking its end; the peeled contiguous tail is
/// returned. Used to strip a trailing alias or column list off a source.
pub(crate) fn consume_until_backwards(
    tokens: &[Token],
    span: &mut TokenSpan,
    stops: &[&str],
    errors: &mut Vec<StructureError>,
) -> TokenSpan {
    let original_end = span.end;
    let mut stack: Vec<usize> = Vec::new();
    let mut idx = span.end;

    while idx > span.start {
        let token = &tokens[idx - 1];

        if let Some(pair) = closer_index(token) {
            stack.push(pair);
        } else if let Some(pair) = opener_index(token) {
            match stack.last() {
                None => {
                    if !in_stops(token, stops) {
                        errors.push(StructureError::UnexpectedBracket {
                            bracket: token.text.clone(),
                            position: Some(token.position),
                        });
                    }
                    break;
                }
                Some(&top) if top == pair => {
                    stack.pop();
                }
                Some(_) => {
                    errors.push(StructureError::UnexpectedBracket {
                        bracket: token.text.clone(),
                        position: Some(token.position),
                    });
                    break;
                }
            }
        } else if stack.is_empty() && in_stops(token, stops) {
            break;
        }

        idx -= 1;
    }

    if let Some(&pair) = stack.last() {
        errors.push(StructureError::UnclosedBracket {
            bracket: PAIRS[pair].1.to_string(),
            position: tokens.get(idx.saturating_sub(1)).map(|t| t.position),
        });
    }

    let peeled = TokenSpan {
        start: idx,
        end: original_end,
    };
    span.end = idx;
    peeled
}
