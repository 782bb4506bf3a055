//! The `GlobalAlloc` adapter, exercised through direct trait calls.
//!
//! The adapter is deliberately NOT installed with `#[global_allocator]`
//! here: the std test harness allocates from several threads, which the
//! allocator's single-threaded contract forbids. Direct calls under a
//! lock exercise the same code paths soundly.

use core::alloc::{GlobalAlloc, Layout};
use std::sync::{Mutex, MutexGuard, OnceLock};

use buddymalloc::BuddyMalloc;

fn heap_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[test]
fn alloc_write_realloc_dealloc_roundtrip() {
    let _guard = heap_lock();
    unsafe {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let p = BuddyMalloc.alloc(layout);
        assert!(!p.is_null());
        assert_eq!(p as usize % 8, 0);
        for i in 0..64 {
            *p.add(i) = i as u8;
        }

        let q = BuddyMalloc.realloc(p, layout, 256);
        assert!(!q.is_null());
        for i in 0..64 {
            assert_eq!(*q.add(i), i as u8);
        }

        BuddyMalloc.dealloc(q, Layout::from_size_align(256, 8).unwrap());
    }
}

#[test]
fn zero_sized_layout_gets_dangling_pointer() {
    let _guard = heap_lock();
    unsafe {
        let layout = Layout::from_size_align(0, 16).unwrap();
        let p = BuddyMalloc.alloc(layout);
        assert_eq!(p as usize, 16, "ZST alloc must return the aligned dangling pointer");
        // dealloc of a ZST pointer is a no-op
        BuddyMalloc.dealloc(p, layout);
    }
}

#[test]
fn over_aligned_layout_is_refused() {
    let _guard = heap_lock();
    unsafe {
        let layout = Layout::from_size_align(256, 64).unwrap();
        assert!(
            BuddyMalloc.alloc(layout).is_null(),
            "alignments above the natural alignment are out of scope"
        );
    }
}

#[test]
fn alloc_zeroed_zeroes() {
    let _guard = heap_lock();
    unsafe {
        let layout = Layout::from_size_align(512, 16).unwrap();
        let p = BuddyMalloc.alloc_zeroed(layout);
        assert!(!p.is_null());
        let slice = std::slice::from_raw_parts(p, 512);
        assert!(slice.iter().all(|&b| b == 0));
        BuddyMalloc.dealloc(p, layout);
    }
}
