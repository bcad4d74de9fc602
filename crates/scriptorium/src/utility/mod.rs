//! # Utilities

pub mod log_space;
pub mod threads;

pub use log_space::{log_add, log_sum_exp};
