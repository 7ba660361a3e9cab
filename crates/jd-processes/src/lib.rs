//! # jd-processes
//!
//! The Merton (1976) jump-diffusion: its five parameters and the
//! discretized log-price step the Monte Carlo simulator applies.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod merton_process;

pub use merton_process::{MertonParameter, MertonParameters, MertonProcess};
