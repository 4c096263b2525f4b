//! Target health checking
//!
//! Provides:
//! - Single-shot HTTP probe with a bounded timeout
//! - UP/DOWN classification carrying the failing status code

pub mod checker;

pub use checker::{CHECK_TIMEOUT, CheckResult, HttpProbe, Probe};
