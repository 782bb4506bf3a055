#![no_main]

use libfuzzer_sys::fuzz_target;

/// Fuzz target that interprets a byte slice as a sequence of allocator
/// operations against the buddy allocator's Rust API.
///
/// Each operation is encoded as:
///   byte 0: bits 0-1 opcode (0=malloc, 1=free, 2=realloc, 3=calloc),
///           bit 2 scales the size by 16 so large requests reach the
///           page-mapped path
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked pointer to operate on)
///
/// We track up to 64 live pointers. The target is single-threaded, which
/// is exactly the allocator's contract.
const MAX_SLOTS: usize = 64;

fuzz_target!(|data: &[u8]| {
    unsafe {
        buddymalloc::init::ensure_initialized();
        let a = buddymalloc::init::allocator();

        let mut slots: [*mut u8; MAX_SLOTS] = [std::ptr::null_mut(); MAX_SLOTS];
        let mut sizes: [usize; MAX_SLOTS] = [0; MAX_SLOTS];

        let mut i = 0;
        while i + 4 <= data.len() {
            let opcode = data[i] & 0x03;
            let scale = if data[i] & 0x04 != 0 { 16 } else { 1 };
            let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize * scale;
            let slot = (data[i + 3] as usize) % MAX_SLOTS;
            i += 4;

            match opcode {
                0 => {
                    // malloc
                    if !slots[slot].is_null() {
                        a.free(slots[slot]);
                    }
                    let ptr = a.malloc(size);
                    slots[slot] = ptr;
                    sizes[slot] = size;
                    if !ptr.is_null() {
                        std::ptr::write_bytes(ptr, 0xAA, size.min(256));
                    }
                }
                1 => {
                    // free
                    if !slots[slot].is_null() {
                        a.free(slots[slot]);
                        slots[slot] = std::ptr::null_mut();
                        sizes[slot] = 0;
                    }
                }
                2 => {
                    // realloc; a null return leaves the original alive
                    let ptr = a.realloc(slots[slot], size);
                    if !ptr.is_null() {
                        if sizes[slot] > 0 && size > 0 {
                            assert_eq!(*ptr, 0xAA, "realloc lost the first payload byte");
                        }
                        slots[slot] = ptr;
                        sizes[slot] = size;
                        std::ptr::write_bytes(ptr, 0xAA, size.min(256));
                    }
                }
                3 => {
                    // calloc
                    if !slots[slot].is_null() {
                        a.free(slots[slot]);
                    }
                    let nmemb = (size >> 8).max(1);
                    let elem_size = (size & 0xFF).max(1);
                    let ptr = a.calloc(nmemb, elem_size);
                    let total = nmemb * elem_size;
                    slots[slot] = ptr;
                    sizes[slot] = total;
                    if !ptr.is_null() {
                        let check_len = total.min(256);
                        for j in 0..check_len {
                            assert_eq!(
                                *ptr.add(j),
                                0,
                                "calloc memory not zeroed at offset {}",
                                j
                            );
                        }
                        std::ptr::write_bytes(ptr, 0xAA, check_len);
                    }
                }
                _ => unreachable!(),
            }
        }

        // Cleanup; afterwards the whole footprint must be back on the
        // free lists (nothing in use, nothing mapped).
        for slot in &mut slots {
            if !slot.is_null() {
                a.free(*slot);
                *slot = std::ptr::null_mut();
            }
        }
        assert_eq!(a.num_free_blocks(), a.num_allocated_blocks());
    }
});
