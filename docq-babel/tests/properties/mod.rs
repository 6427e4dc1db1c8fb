//! Java properties format tests

mod convert;
