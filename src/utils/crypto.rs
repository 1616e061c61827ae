//! # Datagram Cipher
//!
//! Symmetric byte-stream obfuscation applied to every datagram in both
//! directions. The transform is an RC4-style keyed permutation: a 256-entry
//! key schedule followed by a keystream that is XORed onto the input.
//!
//! Applying the transform twice with the same key restores the input, so the
//! same call encrypts and decrypts. There is no nonce: equal plaintext
//! prefixes always produce equal ciphertext prefixes. This is an
//! interoperability layer, not a security mechanism.
//!
//! ```rust
//! use smartswitch_protocol::utils::crypto::Crypto;
//!
//! let crypto = Crypto::switch_default();
//! let sealed = crypto.apply(b"hello switch");
//! assert_eq!(crypto.apply(&sealed), b"hello switch");
//! ```

use crate::error::{ProtocolError, Result};

/// Fixed key shared by every device speaking the protocol.
pub const SWITCH_KEY: &[u8; 256] = b"Ei2HNryt8ysSdRRI54XNQHBEbOIRqNjQgYxsTmuW3srSVRVFyLh8mwvhBLPFQph3\
ecDMLnDtjDUdrUwt7oTsJuYl72hXESNiD6jFIQCtQN1unsmn3JXjeYwGJ55pqTkV\
yN2OOm3vekF6G1LM4t3kiiG4lGwbxG4CG1s5Sli7gcINFBOLXQnPpsQNWDmPbOm7\
4mE7eyR3L7tk8tUhI17FLKm11hrrd1ck74bMw3VYSK3X5RrDgXelewMU6o1tJ3iX";

/// Keyed cipher with a precomputed key schedule.
///
/// The schedule is computed once in [`Crypto::new`]; every call to
/// [`Crypto::apply`] starts the keystream from a fresh copy of it.
#[derive(Clone)]
pub struct Crypto {
    schedule: [u8; 256],
}

impl Crypto {
    /// Build a cipher for an arbitrary non-empty key.
    ///
    /// Keys shorter than 256 bytes are repeated cyclically during scheduling.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(ProtocolError::InvalidKey);
        }
        Ok(Self {
            schedule: key_schedule(key),
        })
    }

    /// Cipher keyed with [`SWITCH_KEY`].
    pub fn switch_default() -> Self {
        Self {
            schedule: key_schedule(SWITCH_KEY),
        }
    }

    /// Transform `data` in place.
    pub fn apply_in_place(&self, data: &mut [u8]) {
        let mut s = self.schedule;
        let mut i: u8 = 0;
        let mut j: u8 = 0;

        for byte in data.iter_mut() {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            let k = s[s[i as usize].wrapping_add(s[j as usize]) as usize];
            *byte ^= k;
        }
    }

    /// Transform `data` into a new buffer.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(&mut out);
        out
    }
}

/// Key-scheduling pass. `key` must be non-empty.
fn key_schedule(key: &[u8]) -> [u8; 256] {
    let mut s = [0u8; 256];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = i as u8;
    }

    let mut j: u8 = 0;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }
    s
}

impl Default for Crypto {
    fn default() -> Self {
        Self::switch_default()
    }
}

impl std::fmt::Debug for Crypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crypto").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Keystream of the fixed key over 32 zero bytes.
    const ZERO_BLOCK_VECTOR: [u8; 32] = [
        0x5C, 0x74, 0x6A, 0x04, 0x7D, 0xBE, 0xB0, 0xB2, 0xFB, 0x6B, 0x06, 0xC3, 0x14, 0x95, 0x7E,
        0x95, 0x42, 0x2B, 0xA2, 0xF5, 0xD7, 0xAF, 0xAE, 0xED, 0x50, 0x8F, 0x46, 0x3D, 0xC2, 0x02,
        0x90, 0x9A,
    ];

    #[test]
    fn test_zero_block_matches_reference() {
        let crypto = Crypto::switch_default();
        assert_eq!(crypto.apply(&[0u8; 32]), ZERO_BLOCK_VECTOR);
    }

    #[test]
    fn test_default_matches_explicit_key() {
        let explicit = Crypto::new(SWITCH_KEY).expect("non-empty key");
        let default = Crypto::switch_default();
        assert_eq!(explicit.schedule, default.schedule);
    }

    #[test]
    fn test_transform_is_involution() {
        let crypto = Crypto::switch_default();
        let data: Vec<u8> = (0..=255u8).cycle().take(1500).collect();
        let sealed = crypto.apply(&data);
        assert_ne!(sealed, data);
        assert_eq!(crypto.apply(&sealed), data);
    }

    #[test]
    fn test_each_call_uses_fresh_state() {
        let crypto = Crypto::switch_default();
        assert_eq!(crypto.apply(b"same input"), crypto.apply(b"same input"));
    }

    #[test]
    fn test_prefix_stability() {
        let crypto = Crypto::switch_default();
        let short = crypto.apply(&[0u8; 8]);
        let long = crypto.apply(&[0u8; 32]);
        assert_eq!(&long[..8], &short[..]);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(Crypto::new(&[]), Err(ProtocolError::InvalidKey)));
    }

    #[test]
    fn test_short_key_is_cycled() {
        let a = Crypto::new(b"ab").unwrap();
        let b = Crypto::new(&b"ab".repeat(128)).unwrap();
        assert_eq!(a.schedule, b.schedule);
    }

    #[test]
    fn test_empty_input() {
        assert!(Crypto::switch_default().apply(&[]).is_empty());
    }
}
