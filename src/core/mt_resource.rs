use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A thread-safe, reference-counted slot guarded by a single mutex.
///
/// `MtResource` is how a chunk shares its published surface with the
/// extraction task that will eventually replace it. The task holds a clone of
/// the handle and swaps its output in while the world grid may be reading the
/// previous surface from the ticking thread; the mutex makes that swap atomic.
///
/// # Examples
///
/// ```
/// use voxel_nav_terrain::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let shared = counter.clone();
///
/// std::thread::spawn(move || *shared.lock() += 1)
///     .join()
///     .unwrap();
///
/// assert_eq!(*counter.lock(), 1);
/// ```
pub struct MtResource<T: Send> {
    resource: Arc<Mutex<T>>,
}

impl<T: Send> MtResource<T> {
    /// Wraps `resource` in a new shared slot.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(Mutex::new(resource)),
        }
    }

    /// Locks the slot for reading or writing.
    ///
    /// A panic on another thread while the lock was held does not poison the
    /// slot for everyone else: the guard is recovered and handed out anyway,
    /// since every writer replaces the contents wholesale.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.resource.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_slot() {
        let a = MtResource::new(vec![1, 2]);
        let b = a.clone();
        b.lock().push(3);

        assert_eq!(*a.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn panic_while_locked_does_not_poison() {
        let slot = MtResource::new(1);
        let shared = slot.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = shared.lock();
            panic!("writer died");
        })
        .join();

        assert!(outcome.is_err());
        *slot.lock() += 1;
        assert_eq!(*slot.lock(), 2);
    }
}
