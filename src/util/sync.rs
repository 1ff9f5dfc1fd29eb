//! Shared access to archive readers.
//!
//! Reading a zip entry seeks the underlying reader, so
//! [`ZipArchive`](crate::archive::ZipArchive) keeps it behind a [`Lock`].
//! With the `threadsafe` feature the lock is a [`Mutex`](std::sync::Mutex)
//! and every [`Archive`](crate::archive::Archive) must be `Send + Sync`.
//! Without it, a [`RefCell`](std::cell::RefCell) is enough.

#[cfg(feature = "threadsafe")]
mod inner {
    use std::sync::{Mutex, MutexGuard};

    pub(crate) type Guard<'a, T> = MutexGuard<'a, T>;

    /// Bound on [`Archive`](crate::archive::Archive) so an archive can be shared across threads.
    pub trait SendAndSync: Send + Sync {}

    pub(crate) struct Lock<T>(Mutex<T>);

    impl<T> Lock<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(Mutex::new(value))
        }

        /// `None` if a previous holder panicked.
        pub(crate) fn acquire(&self) -> Option<Guard<'_, T>> {
            self.0.lock().ok()
        }
    }
}

#[cfg(not(feature = "threadsafe"))]
mod inner {
    use std::cell::{RefCell, RefMut};

    pub(crate) type Guard<'a, T> = RefMut<'a, T>;

    pub trait SendAndSync {}

    pub(crate) struct Lock<T>(RefCell<T>);

    impl<T> Lock<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(RefCell::new(value))
        }

        /// `None` if the reader is already borrowed.
        pub(crate) fn acquire(&self) -> Option<Guard<'_, T>> {
            self.0.try_borrow_mut().ok()
        }
    }
}

pub(crate) use inner::{Guard, Lock};
pub use inner::SendAndSync;

impl<#[cfg(feature = "threadsafe")] A: Send + Sync, #[cfg(not(feature = "threadsafe"))] A>
    SendAndSync for A
{
}
