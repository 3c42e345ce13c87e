//! Credential verifier seam

/// Checks a candidate passphrase against the invoking user's credential.
///
/// Called synchronously from the session loop with the committed buffer
/// contents. Implementations must not retain or log `candidate`.
pub trait CredentialVerifier {
    fn verify(&self, candidate: &[u8]) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&[u8]) -> bool,
{
    fn verify(&self, candidate: &[u8]) -> bool {
        self(candidate)
    }
}
