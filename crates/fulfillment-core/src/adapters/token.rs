//! # Token Adapters
//!
//! Opaque proof-of-possession tokens for batch and furniture QR codes.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;

use crate::ports::outbound::TokenSource;

/// Random 128-bit hex tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn opaque_token(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Deterministic tokens for tests.
#[derive(Debug, Default)]
pub struct SequenceTokenSource {
    counter: AtomicU64,
}

impl SequenceTokenSource {
    /// Create a source counting from zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSource for SequenceTokenSource {
    fn opaque_token(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("qr-{n:04}")
    }
}
