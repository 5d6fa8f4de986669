//! Rotating admin access code (TOTP-style, HMAC-SHA256).
//!
//! The 6-digit code rotates every `step_seconds` and is checked against the
//! current window plus `tolerance` windows either side, so a code typed just
//! as it rolls over still works. The secret never leaves the server; clients
//! only ever submit the derived digits.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DIGITS: u32 = 6;

/// The rotation window an instant falls into.
pub fn window(now_ms: i64, step_seconds: u64) -> i64 {
    let step = (step_seconds.max(1)) as i64;
    (now_ms / 1000).div_euclid(step)
}

/// Derives the 6-digit code for one window.
pub fn code_for_window(secret: &str, window: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key");
    mac.update(&window.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[31] & 0x0f) as usize;
    let slice = &digest[offset..offset + 4];
    let val = u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]) & 0x7fff_ffff;

    let modulus = 10u32.pow(DIGITS);
    let num = val % modulus;

    let mut s = num.to_string();
    while s.len() < DIGITS as usize {
        s.insert(0, '0');
    }
    s
}

/// The code valid right now.
pub fn current_code(secret: &str, now_ms: i64, step_seconds: u64) -> String {
    code_for_window(secret, window(now_ms, step_seconds))
}

/// Checks a submitted code against the current window and `tolerance`
/// neighbours on each side. Whitespace around the input is ignored; anything
/// that is not exactly six digits is rejected without touching the HMAC.
pub fn verify_code(
    secret: &str,
    submitted: &str,
    now_ms: i64,
    step_seconds: u64,
    tolerance: i64,
) -> bool {
    let submitted = submitted.trim();
    if submitted.len() != DIGITS as usize || !submitted.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let center = window(now_ms, step_seconds);
    (-tolerance..=tolerance)
        .any(|delta| code_for_window(secret, center + delta) == submitted)
}
