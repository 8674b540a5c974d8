//! Nom-based splitting of a raw line into its segments.
//!
//! The TMI grammar is
//!
//! ```text
//! ["@" tags " "] [":" source " "] command [" " arg]* [" :" trailing]
//! ```
//!
//! Splitting is total: every input produces parts, malformed input just
//! produces fewer of them.

use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::opt,
    error::{context, VerboseError},
    sequence::{preceded, terminated},
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Tag segment: `@` up to the first space, consuming that space.
fn tags_segment(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing tag segment",
        terminated(preceded(char('@'), take_till(|c| c == ' ')), opt(char(' '))),
    )(input)
}

/// Source segment: `:` up to the first space, consuming that space.
fn source_segment(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing source segment",
        terminated(preceded(char(':'), take_till(|c| c == ' ')), opt(char(' '))),
    )(input)
}

/// A line split into borrowed segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineParts<'a> {
    /// Raw tags (without the `@`).
    pub tags: Option<&'a str>,
    /// Raw source (without the `:`).
    pub source: Option<&'a str>,
    pub command: &'a str,
    pub arguments: Vec<&'a str>,
    /// Everything after the first ` :`, verbatim.
    pub data: Option<&'a str>,
}

impl<'a> LineParts<'a> {
    /// Split a line. Returns `None` only when the line is empty once its
    /// line ending is removed.
    pub(crate) fn split(line: &'a str) -> Option<LineParts<'a>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return None;
        }

        let (rest, tags) = opt(tags_segment)(line).unwrap_or((line, None));
        let (rest, source) = opt(source_segment)(rest).unwrap_or((rest, None));

        let (head, data) = match rest.split_once(" :") {
            Some((head, data)) => (head, Some(data)),
            None => (rest, None),
        };

        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = words.next().unwrap_or("");
        let arguments = words.collect();

        Some(LineParts {
            tags,
            source,
            command,
            arguments,
            data,
        })
    }
}
