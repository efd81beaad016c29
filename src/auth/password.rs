use bcrypt::{hash, verify, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let hashed = hash(password, DEFAULT_COST)
        .map_err(|e| anyhow::anyhow!("password hashing error: {:?}", e))?;
    Ok(hashed)
}

/// A hash that fails to parse counts as a mismatch rather than an error, so
/// corrupted rows cannot be logged into.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, anyhow::Error> {
    match verify(password, hash) {
        Ok(is_valid) => Ok(is_valid),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_mismatch_fails() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong horse", &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_a_mismatch_not_an_error() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").unwrap());
    }
}
