use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Six-digit possession-factor code, `100000..=999999`.
pub fn generate_code() -> String {
    let code: u32 = thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Codes are stored as hex SHA-256 digests, never in the clear.
pub fn digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Constant-time comparison of a submitted code against a stored digest.
pub fn verify(code: &str, stored_digest: &str) -> bool {
    let computed = digest(code);
    computed.as_bytes().ct_eq(stored_digest.as_bytes()).into()
}
