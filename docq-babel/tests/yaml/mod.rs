//! YAML format tests

mod convert;
mod stream;
