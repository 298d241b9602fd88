//! Tokenizer for property paths.
//!
//! path    = first (("." key) | index)*
//! first   = index | key
//! key     = any run of characters except ".", "[" and "]"
//! index   = "[" digits "]"

use winnow::ascii::digit1;
use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::prelude::*;
use winnow::token::take_while;

use super::ast::PathSegment;

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn key_segment(input: &mut &str) -> PResult<PathSegment> {
    take_while(1.., |c: char| !matches!(c, '.' | '[' | ']'))
        .map(|key: &str| PathSegment::Key(key.to_string()))
        .parse_next(input)
}

fn index_segment(input: &mut &str) -> PResult<PathSegment> {
    delimited('[', digit1, ']')
        .verify_map(|digits: &str| digits.parse::<usize>().ok())
        .map(PathSegment::Index)
        .parse_next(input)
}

fn first_segment(input: &mut &str) -> PResult<PathSegment> {
    alt((index_segment, key_segment)).parse_next(input)
}

fn next_segment(input: &mut &str) -> PResult<PathSegment> {
    alt((preceded('.', key_segment), index_segment)).parse_next(input)
}

fn path_segments(input: &mut &str) -> PResult<Vec<PathSegment>> {
    let first = first_segment(input)?;
    let rest: Vec<PathSegment> = repeat(0.., next_segment).parse_next(input)?;

    let mut segments = Vec::with_capacity(rest.len() + 1);
    segments.push(first);
    segments.extend(rest);
    Ok(segments)
}

/// Tokenize a whole property path.
pub fn tokenize_path(input: &str) -> Result<Vec<PathSegment>, String> {
    let mut remaining = input;
    match path_segments(&mut remaining) {
        Ok(_) if !remaining.is_empty() => {
            Err(format!("Unexpected input in path at '{}'", remaining))
        }
        Ok(segments) => Ok(segments),
        Err(e) => Err(format!("Path error at '{}': {:?}", remaining, e)),
    }
}
