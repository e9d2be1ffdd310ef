//! One-shot latch
//!
//! A flag that goes from unset to set exactly once and wakes every task
//! waiting on it. Used for "controller has spoken" and "init finished".

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Maximum tasks parked on one latch at once
pub const MAX_LATCH_WAITERS: usize = 8;

struct LatchState {
    set: bool,
    waiters: MultiWakerRegistration<MAX_LATCH_WAITERS>,
}

/// One-shot broadcast latch
pub struct Latch<M: RawMutex> {
    inner: BlockingMutex<M, RefCell<LatchState>>,
}

impl<M: RawMutex> Default for Latch<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Latch<M> {
    /// Create an unset latch
    pub const fn new() -> Self {
        Self {
            inner: BlockingMutex::new(RefCell::new(LatchState {
                set: false,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Set the latch and resume every waiter; setting twice is harmless
    pub fn set(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.set = true;
            state.waiters.wake();
        });
    }

    /// Whether the latch has been set
    pub fn is_set(&self) -> bool {
        self.inner.lock(|state| state.borrow().set)
    }

    /// Wait until the latch is set (returns immediately if it already is)
    pub async fn wait(&self) {
        poll_fn(|cx| {
            self.inner.lock(|state| {
                let mut state = state.borrow_mut();
                if state.set {
                    Poll::Ready(())
                } else {
                    let _ = state.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }
}
