//! Decode/encode operator tests

mod comments;
mod nesting;
mod newlines;
