#![forbid(unsafe_code)]

pub mod assembler;
pub mod generation;
pub mod text_adapter;
pub mod validation;
