use crate::allocator::BuddyAllocator;
use crate::hardening::cookie;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

pub static INIT_STATE: AtomicU8 = AtomicU8::new(UNINIT);

struct AllocatorHolder(UnsafeCell<BuddyAllocator>);
unsafe impl Sync for AllocatorHolder {}

static ALLOCATOR: AllocatorHolder = AllocatorHolder(UnsafeCell::new(BuddyAllocator::new()));

/// First-call initialisation: draw the process cookie, then claim and
/// carve the arena. A failed break extension parks the state in FAILED
/// and every public operation reports exhaustion from then on -- init
/// failure is an allocation failure, never an abort.
///
/// # Safety
/// Single-threaded (the allocator's global contract).
#[cold]
#[inline(never)]
pub unsafe fn ensure_initialized() {
    match INIT_STATE.compare_exchange(UNINIT, INITIALIZING, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {}
        Err(_) => return,
    }

    cookie::generate();

    if (*ALLOCATOR.0.get()).init() {
        INIT_STATE.store(READY, Ordering::Release);
    } else {
        INIT_STATE.store(FAILED, Ordering::Release);
    }
}

/// The process allocator instance.
///
/// # Safety
/// Callers must respect the single-threaded contract of every method.
#[inline(always)]
pub unsafe fn allocator() -> &'static BuddyAllocator {
    &*ALLOCATOR.0.get()
}

#[inline(always)]
pub fn state() -> u8 {
    INIT_STATE.load(Ordering::Acquire)
}

pub const STATE_READY: u8 = READY;
