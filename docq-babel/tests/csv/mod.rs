//! CSV and TSV format tests

mod tables;
