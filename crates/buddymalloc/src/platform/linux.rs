use core::ptr;

/// Read the current program break. `sbrk(0)` never fails.
pub unsafe fn current_break() -> *mut u8 {
    libc::sbrk(0) as *mut u8
}

/// Extend the program break by `delta` bytes.
/// Returns the previous break, or null if the kernel refuses.
///
/// # Safety
/// No other thread may be moving the break concurrently.
pub unsafe fn extend_break(delta: usize) -> *mut u8 {
    let prev = libc::sbrk(delta as libc::intptr_t);
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
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
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

/// Draw 32 random bits, preferring the getrandom syscall.
/// Falls back to splitmix64 over ambient addresses when the syscall is
/// unavailable (seccomp sandboxes, ancient kernels).
pub fn random_u32() -> u32 {
    let mut val: u32 = 0;
    let got = unsafe {
        libc::getrandom(
            &mut val as *mut u32 as *mut libc::c_void,
            core::mem::size_of::<u32>(),
            0,
        )
    };
    if got == core::mem::size_of::<u32>() as isize {
        return val;
    }
    let stack = &val as *const u32 as u64;
    let pid = unsafe { libc::getpid() } as u64;
    crate::platform::splitmix64(stack ^ (pid << 32)) as u32
}
