//! Poison recovery for std::sync locks
//!
//! Poisoned guards are logged and reused; every lock in this crate protects data
//! that is valid between statements.

use crate::error::Result;
use std::sync::{LockResult, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn recover<G>(result: LockResult<G>, kind: &str) -> Result<G> {
    result.or_else(|poisoned| {
        log::warn!("{kind} was poisoned, recovering");
        Ok(poisoned.into_inner())
    })
}

/// Extension trait for Mutex with poison recovery
pub trait MutexExt<T> {
    fn lock_recovered(&self) -> Result<MutexGuard<'_, T>>;
}

/// Extension trait for RwLock with poison recovery
pub trait RwLockExt<T> {
    fn read_recovered(&self) -> Result<RwLockReadGuard<'_, T>>;

    fn write_recovered(&self) -> Result<RwLockWriteGuard<'_, T>>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> Result<MutexGuard<'_, T>> {
        recover(self.lock(), "Mutex")
    }
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> Result<RwLockReadGuard<'_, T>> {
        recover(self.read(), "RwLock (read)")
    }

    fn write_recovered(&self) -> Result<RwLockWriteGuard<'_, T>> {
        recover(self.write(), "RwLock (write)")
    }
}
