//! JSON format tests

mod encode;
