#![forbid(unsafe_code)]

pub mod clean_cli;
