//! Password database access and privilege drop

use std::ffi::{c_char, CStr};
use std::io;

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::PrivilegeError;

/// The real (invoking) user and their stored hash
pub(super) struct Account {
    pub name: String,
    pub uid: libc::uid_t,
    pub gid: libc::gid_t,
    pub hash: Zeroizing<String>,
}

/// Copy a C string owned by libc static storage.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn owned(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Look up the real uid's passwd (and shadow) entry.
///
/// Must run with an effective uid of 0.
pub(super) fn invoking_account() -> Result<Account, PrivilegeError> {
    // SAFETY: the id getters have no preconditions.
    let (euid, uid) = unsafe { (libc::geteuid(), libc::getuid()) };
    if euid != 0 {
        return Err(PrivilegeError::NotPrivileged);
    }

    // SAFETY: getpwuid returns null or a pointer to static storage that stays
    // valid until the next passwd call; every field is copied before endpwent.
    let entry = unsafe {
        let pw = libc::getpwuid(uid);
        let entry = if pw.is_null() {
            None
        } else {
            let pw = &*pw;
            Some((
                owned(pw.pw_name),
                Zeroizing::new(owned(pw.pw_passwd)),
                pw.pw_gid,
            ))
        };
        libc::endpwent();
        entry
    };

    let (name, passwd, gid) = entry.ok_or(PrivilegeError::NoPasswdEntry { uid })?;
    let hash = if passwd.as_str() == "x" {
        shadow_hash(&name)?
    } else {
        passwd
    };

    Ok(Account {
        name,
        uid,
        gid,
        hash,
    })
}

#[cfg(target_os = "linux")]
fn shadow_hash(user: &str) -> Result<Zeroizing<String>, PrivilegeError> {
    let missing = || PrivilegeError::NoShadowEntry {
        user: user.to_string(),
    };
    let name = std::ffi::CString::new(user).map_err(|_| missing())?;

    // SAFETY: `name` is NUL-terminated; the returned entry is copied before
    // endspent invalidates it.
    let hash = unsafe {
        let sp = libc::getspnam(name.as_ptr());
        let hash = if sp.is_null() {
            None
        } else {
            Some(Zeroizing::new(owned((*sp).sp_pwdp)))
        };
        libc::endspent();
        hash
    };

    hash.ok_or_else(missing)
}

#[cfg(not(target_os = "linux"))]
fn shadow_hash(user: &str) -> Result<Zeroizing<String>, PrivilegeError> {
    Err(PrivilegeError::NoShadowEntry {
        user: user.to_string(),
    })
}

/// Switch every id to the invoking user and make sure root is gone for good
pub(super) fn drop_privileges(uid: libc::uid_t, gid: libc::gid_t) -> Result<(), PrivilegeError> {
    let last_error = || PrivilegeError::Drop(io::Error::last_os_error());

    // SAFETY: plain syscalls; `gid` outlives the setgroups call.
    unsafe {
        if libc::setgroups(1, &gid) != 0 {
            return Err(last_error());
        }
        if libc::setgid(gid) != 0 {
            return Err(last_error());
        }
        if libc::setuid(uid) != 0 {
            return Err(last_error());
        }
    }

    // SAFETY: as above.
    if uid != 0 && unsafe { libc::setuid(0) } == 0 {
        return Err(PrivilegeError::Regainable);
    }

    debug!(uid, gid, "privileges dropped");
    Ok(())
}

/// Keep the password hash out of core dumps and away from ptrace
#[cfg(target_os = "linux")]
pub(super) fn harden_process() {
    // SAFETY: PR_SET_DUMPABLE takes a single integer argument.
    let failed = unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0) } != 0;
    if failed {
        debug!(error = %io::Error::last_os_error(), "prctl(PR_SET_DUMPABLE) failed");
    }
}

#[cfg(not(target_os = "linux"))]
pub(super) fn harden_process() {}
