// src/lib.rs — windowbench library root

pub mod cli;
pub mod infra;
pub mod scoring;
