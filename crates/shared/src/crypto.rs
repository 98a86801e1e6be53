//! Random code generation for share links.

use rand::Rng;

/// Characters a share code is drawn from.
pub const SHARE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every share code.
pub const SHARE_CODE_LENGTH: usize = 8;

/// Draws a fresh share code using the thread-local CSPRNG.
pub fn generate_share_code() -> String {
    generate_share_code_with(&mut rand::thread_rng())
}

/// Draws a share code from the given RNG.
pub fn generate_share_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SHARE_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..SHARE_CODE_ALPHABET.len());
            SHARE_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Upper-cases and trims a user supplied code so lookups are case-insensitive.
pub fn normalize_share_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Returns true when the (already normalized) code has the share code shape.
pub fn is_share_code(code: &str) -> bool {
    code.len() == SHARE_CODE_LENGTH && code.bytes().all(|b| SHARE_CODE_ALPHABET.contains(&b))
}
