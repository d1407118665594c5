// src/utils/mod.rs

pub mod topic;
