#![forbid(unsafe_code)]

pub mod bulk;
pub mod row;
