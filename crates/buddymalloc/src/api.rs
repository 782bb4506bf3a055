use crate::init::{self, STATE_READY};
use core::ffi::c_void;
use core::ptr;

/// Dispatch macro: route to the allocator once init has run, falling back
/// to the failure sentinel when init could not claim the arena.
macro_rules! dispatch {
    ($ready:expr, $failed:expr) => {{
        match init::state() {
            STATE_READY => $ready,
            _ => {
                init::ensure_initialized();
                match init::state() {
                    STATE_READY => $ready,
                    _ => $failed,
                }
            }
        }
    }};
}

// ============================================================================
// Allocation entry points
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn smalloc(size: usize) -> *mut c_void {
    dispatch!(
        init::allocator().malloc(size) as *mut c_void,
        ptr::null_mut()
    )
}

#[no_mangle]
pub unsafe extern "C" fn scalloc(num: usize, size: usize) -> *mut c_void {
    dispatch!(
        init::allocator().calloc(num, size) as *mut c_void,
        ptr::null_mut()
    )
}

#[no_mangle]
pub unsafe extern "C" fn srealloc(oldp: *mut c_void, size: usize) -> *mut c_void {
    dispatch!(
        init::allocator().realloc(oldp as *mut u8, size) as *mut c_void,
        ptr::null_mut()
    )
}

#[no_mangle]
pub unsafe extern "C" fn sfree(p: *mut c_void) {
    dispatch!(init::allocator().free(p as *mut u8), ())
}

// ============================================================================
// Introspection counters
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn num_free_blocks() -> usize {
    dispatch!(init::allocator().num_free_blocks(), 0)
}

#[no_mangle]
pub unsafe extern "C" fn num_free_bytes() -> usize {
    dispatch!(init::allocator().num_free_bytes(), 0)
}

#[no_mangle]
pub unsafe extern "C" fn num_allocated_blocks() -> usize {
    dispatch!(init::allocator().num_allocated_blocks(), 0)
}

#[no_mangle]
pub unsafe extern "C" fn num_allocated_bytes() -> usize {
    dispatch!(init::allocator().num_allocated_bytes(), 0)
}

#[no_mangle]
pub unsafe extern "C" fn num_meta_data_bytes() -> usize {
    dispatch!(init::allocator().num_meta_data_bytes(), 0)
}

/// Header size is a compile-time fact; no init or state check needed.
#[no_mangle]
pub unsafe extern "C" fn size_meta_data() -> usize {
    init::allocator().size_meta_data()
}
