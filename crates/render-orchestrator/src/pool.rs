//! Browser-page pool: a `Semaphore` bounds concurrent renders to the
//! configured parallelism, paired with a `Mutex<Vec<PageHandle>>` bag for
//! reuse (§5.1) -- the nearest safe-Rust equivalent of a lock-free MPMC bag
//! without reaching for a crate absent from this codebase's stack.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

pub struct PagePool {
    semaphore: Arc<Semaphore>,
    bag: Arc<Mutex<Vec<PageHandle>>>,
    next_id: Arc<AtomicUsize>,
}

impl PagePool {
    /// `capacity` is the degree of render parallelism (§4.5: "the pool's
    /// upper bound is the degree of render parallelism").
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            bag: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take a page: acquire a permit, then pop a handle from the reuse bag
    /// or mint a new one. The returned guard releases both on drop.
    pub async fn acquire(&self) -> PooledPage {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("pool semaphore is never closed");
        let handle = {
            let mut bag = self.bag.lock().await;
            bag.pop()
        }
        .unwrap_or_else(|| PageHandle(self.next_id.fetch_add(1, Ordering::Relaxed)));

        PooledPage {
            handle,
            bag: self.bag.clone(),
            _permit: permit,
        }
    }
}

/// A checked-out page. Dropping it returns the handle to the bag and
/// releases the semaphore permit, making the slot available again.
pub struct PooledPage {
    pub handle: PageHandle,
    bag: Arc<Mutex<Vec<PageHandle>>>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for PooledPage {
    fn drop(&mut self) {
        if let Ok(mut bag) = self.bag.try_lock() {
            bag.push(self.handle);
        }
    }
}
