//! Comparison of shared secrets (device API key, debug PIN).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const COMPARE_KEY: &[u8] = b"greenhouse-secret-compare";

fn mac_of(value: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(COMPARE_KEY).expect("HMAC accepts any key length");
    mac.update(value.as_bytes());
    mac
}

/// Constant-time equality: both sides are MACed to a fixed length and the tags
/// are checked with `verify_slice`.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let expected = mac_of(expected).finalize().into_bytes();
    mac_of(presented).verify_slice(&expected).is_ok()
}
