//! Host credential verification
//!
//! [`SystemVerifier::acquire`] is the one place sflock runs with elevated
//! privilege: it reads the invoking user's password hash, drops to that
//! user, and hands back a verifier. Nothing else is constructed before it.

mod account;
mod crypt;

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sflock_core::CredentialVerifier;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::PrivilegeError;

/// A stored password hash, classified by how it is checked
enum StoredHash {
    /// Argon2 PHC string
    Argon2(Zeroizing<String>),
    /// Anything `crypt(3)` understands, NUL-terminated
    Crypt(Zeroizing<Vec<u8>>),
}

impl StoredHash {
    fn parse(user: &str, hash: &str) -> Result<Self, PrivilegeError> {
        let unusable = || PrivilegeError::UnusableHash {
            user: user.to_string(),
        };

        // Empty means no password; `!` and `*` mark locked accounts
        if hash.is_empty() || hash.starts_with('!') || hash.starts_with('*') {
            return Err(unusable());
        }

        if hash.starts_with("$argon2") {
            let parsed = PasswordHash::new(hash).map_err(|_| unusable())?;
            if parsed.hash.is_none() {
                return Err(unusable());
            }
            return Ok(StoredHash::Argon2(Zeroizing::new(hash.to_string())));
        }

        if hash.as_bytes().contains(&0) {
            return Err(unusable());
        }
        let mut setting = Zeroizing::new(Vec::with_capacity(hash.len() + 1));
        setting.extend_from_slice(hash.as_bytes());
        setting.push(0);
        Ok(StoredHash::Crypt(setting))
    }

    fn scheme(&self) -> &'static str {
        match self {
            StoredHash::Argon2(_) => "argon2",
            StoredHash::Crypt(_) => "crypt",
        }
    }

    fn verify(&self, candidate: &[u8]) -> bool {
        match self {
            StoredHash::Argon2(hash) => match PasswordHash::new(hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(candidate, &parsed)
                    .is_ok(),
                Err(e) => {
                    warn!(error = %e, "stored argon2 hash no longer parses");
                    false
                }
            },
            StoredHash::Crypt(setting) => crypt::matches(candidate, setting),
        }
    }
}

/// Verifies passphrases against the invoking user's system password
pub struct SystemVerifier {
    user: String,
    hash: StoredHash,
}

impl SystemVerifier {
    /// Read the invoking user's hash, then drop to that user.
    ///
    /// Requires an effective uid of 0. On success the process no longer
    /// holds any elevated privilege.
    pub fn acquire() -> Result<Self, PrivilegeError> {
        account::harden_process();
        let account = account::invoking_account()?;
        account::drop_privileges(account.uid, account.gid)?;
        account::harden_process();

        let verifier = Self::from_hash(&account.name, &account.hash)?;
        info!(
            user = %verifier.user,
            scheme = verifier.hash.scheme(),
            "credential loaded, privileges dropped"
        );
        Ok(verifier)
    }

    /// Build a verifier from an already-read hash
    pub fn from_hash(user: &str, hash: &str) -> Result<Self, PrivilegeError> {
        Ok(Self {
            user: user.to_string(),
            hash: StoredHash::parse(user, hash)?,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl CredentialVerifier for SystemVerifier {
    fn verify(&self, candidate: &[u8]) -> bool {
        self.hash.verify(candidate)
    }
}

impl fmt::Debug for SystemVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemVerifier")
            .field("user", &self.user)
            .field("scheme", &self.hash.scheme())
            .finish_non_exhaustive()
    }
}

/// Byte comparison whose duration does not depend on where inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
