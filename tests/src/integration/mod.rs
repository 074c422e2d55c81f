//! Cross-component integration tests.

pub mod concurrency;
pub mod scenarios;
pub mod support;
