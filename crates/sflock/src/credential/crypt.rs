//! `crypt(3)` binding

use std::ffi::{c_char, CStr};
use std::sync::Mutex;

use tracing::warn;
use zeroize::Zeroizing;

use super::constant_time_eq;

#[link(name = "crypt")]
extern "C" {
    fn crypt(key: *const c_char, setting: *const c_char) -> *mut c_char;
}

/// `crypt` returns a pointer into static storage
static CRYPT_LOCK: Mutex<()> = Mutex::new(());

/// Hash `key` with `setting` and hand the NUL-free result to `f`
fn with_crypt<T>(key: &[u8], setting: &[u8], f: impl FnOnce(&[u8]) -> T) -> Option<T> {
    debug_assert_eq!(setting.last(), Some(&0));
    if key.contains(&0) {
        return None;
    }

    let mut c_key = Zeroizing::new(Vec::with_capacity(key.len() + 1));
    c_key.extend_from_slice(key);
    c_key.push(0);

    let _guard = CRYPT_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    // SAFETY: both arguments are NUL-terminated and outlive the call.
    let out = unsafe { crypt(c_key.as_ptr().cast(), setting.as_ptr().cast()) };
    if out.is_null() {
        warn!("crypt(3) rejected the stored hash");
        return None;
    }

    // SAFETY: non-null results are NUL-terminated strings valid until the
    // next call, which the lock rules out.
    let computed = unsafe { CStr::from_ptr(out) };
    Some(f(computed.to_bytes()))
}

/// Whether `candidate` hashes to `setting` (a NUL-terminated stored hash)
pub(super) fn matches(candidate: &[u8], setting: &[u8]) -> bool {
    let stored = &setting[..setting.len().saturating_sub(1)];
    with_crypt(candidate, setting, |computed| constant_time_eq(computed, stored)).unwrap_or(false)
}

#[cfg(test)]
pub(super) fn hash(key: &[u8], setting: &str) -> Option<String> {
    let mut c_setting = setting.as_bytes().to_vec();
    c_setting.push(0);
    with_crypt(key, &c_setting, |computed| {
        String::from_utf8_lossy(computed).into_owned()
    })
}
