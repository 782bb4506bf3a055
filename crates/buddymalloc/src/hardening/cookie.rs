use crate::platform;
use core::sync::atomic::{AtomicU32, Ordering};

/// Process-lifetime header cookie. Every block header carries a copy;
/// a mismatch means something scribbled over heap metadata.
/// Zero until init draws a value.
static COOKIE: AtomicU32 = AtomicU32::new(0);

/// Draw the cookie. Called exactly once, from init, before the first
/// header is written.
pub fn generate() {
    let mut val = platform::random_u32();
    if val == 0 {
        // zero marks "not yet drawn"; nudge the one-in-four-billion case
        val = 0xB1DD_7C0D;
    }
    COOKIE.store(val, Ordering::Relaxed);
}

/// The process cookie.
#[inline(always)]
pub fn get() -> u32 {
    COOKIE.load(Ordering::Relaxed)
}
