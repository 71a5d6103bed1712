//! Token scanning and placeholder-body parsing.
//!
//! - [`scan`] / [`TokenPair::scan`] find `#{...}` and `${...}` tokens, honouring
//!   backslash escapes, and splice in the handler's replacement.
//! - [`TokenPair::rewrite`] edits token bodies in place and keeps escapes, for
//!   text that will be scanned again later.
//! - [`parse_placeholder`] parses the body of one `#{...}` token into
//!   [`PlaceholderAttributes`].

mod placeholder;
mod token;

#[cfg(test)]
mod tests;

pub use placeholder::{PlaceholderAttributes, parse_placeholder};
pub use token::{
    PARAMETER_TOKENS, SCRIPT_TOKENS, Segment, Segments, TokenHandler, TokenPair, scan,
};
