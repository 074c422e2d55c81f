//! # Fulfillment Test Suite
//!
//! Unified test crate for the fulfillment core.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs       # Shared fixture: wired coordinator + seeded directory
//!     ├── scenarios.rs     # End-to-end delivery scenarios (scan, confirm-later, disposal)
//!     └── concurrency.rs   # Racing transitions and batch-claim exclusivity
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p fulfillment-tests
//!
//! # By category
//! cargo test -p fulfillment-tests integration::scenarios::
//! cargo test -p fulfillment-tests integration::concurrency::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
