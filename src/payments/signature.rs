use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Verifies the `X-ANET-Signature` header against the raw webhook body.
///
/// The header value is `sha512=<hex>` where the digest is HMAC-SHA512 of the
/// body keyed with the merchant's signature key. The provider emits the hex
/// in upper case; comparison is case-insensitive and constant-time.
pub fn verify_webhook_signature(payload: &[u8], key: &str, header: &str) -> bool {
    let supplied = header
        .trim()
        .strip_prefix("sha512=")
        .or_else(|| header.trim().strip_prefix("SHA512="))
        .unwrap_or_else(|| header.trim())
        .to_lowercase();

    let mut mac = match HmacSha512::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let computed = hex::encode(mac.finalize().into_bytes());
    secure_eq(computed.as_bytes(), supplied.as_bytes())
}

fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
