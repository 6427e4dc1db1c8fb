//! XML format tests
//!
//! Structural inference on decode, layout on encode, comment placement both ways.

mod comments;
mod decode;
mod encode;
mod roundtrip;
