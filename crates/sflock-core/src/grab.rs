//! Exclusive input acquisition
//!
//! Pointer first, then keyboard, each retried on contention up to a fixed
//! budget. The returned [`GrabHandle`] owns the grab: it releases it exactly
//! once, whether the session ends normally, errors out or unwinds.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{GrabFailure, SurfaceError};
use crate::surface::DisplaySurface;

/// Default attempts per device
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Retry budget for a grab
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrabPolicy {
    /// Attempts allowed for each of pointer and keyboard
    pub max_attempts: u32,
    /// Sleep between consecutive attempts
    pub retry_delay: Duration,
}

impl Default for GrabPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Acquires exclusive pointer and keyboard input on a surface
#[derive(Clone, Copy, Debug, Default)]
pub struct GrabManager {
    policy: GrabPolicy,
}

impl GrabManager {
    pub fn new(policy: GrabPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GrabPolicy {
        self.policy
    }

    /// Grab pointer then keyboard.
    ///
    /// On failure nothing stays grabbed: whatever was taken is released
    /// before the error is returned.
    pub fn acquire<'s, S>(&self, surface: &'s mut S) -> Result<GrabHandle<'s, S>, GrabFailure>
    where
        S: DisplaySurface + ?Sized,
    {
        let mut handle = GrabHandle {
            surface,
            released: false,
        };

        let pointer_attempts = match self.retry("pointer", || handle.grab_pointer()) {
            Ok(attempts) => attempts,
            Err(attempts) => {
                handle.release();
                return Err(GrabFailure::Pointer { attempts });
            }
        };

        let keyboard_attempts = match self.retry("keyboard", || handle.grab_keyboard()) {
            Ok(attempts) => attempts,
            Err(attempts) => {
                handle.release();
                return Err(GrabFailure::Keyboard { attempts });
            }
        };

        debug!(pointer_attempts, keyboard_attempts, "input grabbed");
        Ok(handle)
    }

    /// Run `attempt` until it succeeds or the budget is spent.
    ///
    /// `Ok` carries the attempt that succeeded, `Err` the attempts made.
    fn retry<F>(&self, device: &str, mut attempt: F) -> Result<u32, u32>
    where
        F: FnMut() -> Result<(), SurfaceError>,
    {
        let max = self.policy.max_attempts;

        for n in 1..=max {
            match attempt() {
                Ok(()) => return Ok(n),
                Err(e) => trace!(device, attempt = n, error = %e, "grab refused"),
            }

            if n < max && !self.policy.retry_delay.is_zero() {
                thread::sleep(self.policy.retry_delay);
            }
        }

        warn!(device, attempts = max, "grab retry budget exhausted");
        Err(max)
    }
}

/// Ownership of the input grab on a surface.
///
/// Dereferences to the surface so the session can keep drawing while the
/// grab is held.
pub struct GrabHandle<'s, S: DisplaySurface + ?Sized> {
    surface: &'s mut S,
    released: bool,
}

impl<S: DisplaySurface + ?Sized> GrabHandle<'_, S> {
    /// Release the grab. Only the first call has any effect.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.surface.ungrab_all() {
            Ok(()) => debug!("input grab released"),
            Err(e) => warn!(error = %e, "failed to release input grab"),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<S: DisplaySurface + ?Sized> Deref for GrabHandle<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DisplaySurface + ?Sized> DerefMut for GrabHandle<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DisplaySurface + ?Sized> Drop for GrabHandle<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: DisplaySurface + ?Sized> fmt::Debug for GrabHandle<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabHandle")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}
