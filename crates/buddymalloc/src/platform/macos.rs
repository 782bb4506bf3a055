use core::ptr;

/// Read the current program break. `sbrk(0)` never fails.
pub unsafe fn current_break() -> *mut u8 {
    libc::sbrk(0) as *mut u8
}

/// Extend the program break by `delta` bytes.
/// Returns the previous break, or null if the kernel refuses.
/// Darwin's `sbrk` takes a 32-bit increment; oversized deltas are refused
/// here rather than truncated.
///
/// # Safety
/// No other thread may be moving the break concurrently.
pub unsafe fn extend_break(delta: usize) -> *mut u8 {
    if delta > libc::c_int::MAX as usize {
        return ptr::null_mut();
    }
    let prev = libc::sbrk(delta as libc::c_int);
    if prev as isize == -1 {
        ptr::null_mut()
    } else {
        prev as *mut u8
    }
}

/// Map anonymous read-write memory.
///
/// # Safety
/// `size` must be non-zero. The kernel rounds the length up to whole pages.
pub unsafe fn map_anonymous(size: usize) -> *mut u8 {
    let result = libc::mmap(
        ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANON,
        -1,
        0,
    );
    if result == libc::MAP_FAILED {
        ptr::null_mut()
    } else {
        result as *mut u8
    }
}

/// Unmap memory. Returns false if the kernel refuses.
///
/// # Safety
/// `ptr` must have been returned by `map_anonymous` with the same `size`.
pub unsafe fn unmap(ptr: *mut u8, size: usize) -> bool {
    libc::munmap(ptr as *mut libc::c_void, size) == 0
}

/// Draw 32 random bits. `arc4random` cannot fail on Darwin.
pub fn random_u32() -> u32 {
    unsafe { libc::arc4random() }
}
