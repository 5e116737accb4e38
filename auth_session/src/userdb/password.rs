//! Password hashing using PBKDF2-HMAC-SHA256.
//!
//! Stored hashes look like `pbkdf2-sha256$<iterations>$<salt>$<hash>` with
//! salt and hash base64url encoded, so the work factor can be raised later
//! without invalidating existing records.

use std::num::NonZeroU32;

use ring::{digest, pbkdf2};

use crate::utils::{UtilError, base64url_decode, base64url_encode, gen_random_bytes};

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const HASH_SCHEME: &str = "pbkdf2-sha256";
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
const SALT_LEN: usize = 16;
const DEFAULT_ITERATIONS: u32 = 100_000;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, UtilError> {
    hash_password_with_iterations(password, DEFAULT_ITERATIONS)
}

pub(crate) fn hash_password_with_iterations(
    password: &str,
    iterations: u32,
) -> Result<String, UtilError> {
    let rounds = NonZeroU32::new(iterations)
        .ok_or_else(|| UtilError::Crypto("Iteration count must be non-zero".to_string()))?;
    let salt = gen_random_bytes(SALT_LEN)?;

    let mut credential = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(PBKDF2_ALG, rounds, &salt, password.as_bytes(), &mut credential);

    Ok(format!(
        "{HASH_SCHEME}${iterations}${}${}",
        base64url_encode(&salt),
        base64url_encode(&credential)
    ))
}

/// Verify a password against a stored hash.
///
/// A malformed stored hash never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match parse_stored_hash(stored) {
        Ok((rounds, salt, credential)) => {
            pbkdf2::verify(PBKDF2_ALG, rounds, &salt, password.as_bytes(), &credential).is_ok()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

fn parse_stored_hash(stored: &str) -> Result<(NonZeroU32, Vec<u8>, Vec<u8>), UtilError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(UtilError::Format("Unexpected password hash layout".to_string()));
    };

    if scheme != HASH_SCHEME {
        return Err(UtilError::Format(format!("Unknown hash scheme: {scheme}")));
    }

    let rounds = iterations
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| UtilError::Format("Invalid iteration count".to_string()))?;

    Ok((rounds, base64url_decode(salt)?, base64url_decode(hash)?))
}
