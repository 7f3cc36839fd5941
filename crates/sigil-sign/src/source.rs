//! Clock and nonce sources used when issuing tokens.

use chrono::Utc;
use rand::RngCore;

/// Nonces are kept to 31 bits.
pub const NONCE_MASK: u32 = 0x7fff_ffff;

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Source of per-token nonces.
pub trait NonceSource: Send + Sync {
    fn nonce(&self) -> u32;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Nonces from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngNonce;

impl NonceSource for ThreadRngNonce {
    fn nonce(&self) -> u32 {
        rand::rng().next_u32() & NONCE_MASK
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Always returns the same nonce.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub u32);

impl NonceSource for FixedNonce {
    fn nonce(&self) -> u32 {
        self.0 & NONCE_MASK
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<T: NonceSource + ?Sized> NonceSource for &T {
    fn nonce(&self) -> u32 {
        (**self).nonce()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn test_nonce_fits_31_bits() {
        for _ in 0..64 {
            assert!(ThreadRngNonce.nonce() <= NONCE_MASK);
        }
        assert_eq!(FixedNonce(u32::MAX).nonce(), NONCE_MASK);
    }
}
