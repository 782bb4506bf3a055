//! In-place realloc growth through free buddies. The single test function
//! runs against a pristine arena so block addresses are deterministic:
//! the first allocation always lands at the bottom of the arena.

#[test]
fn realloc_grows_through_free_buddies() {
    unsafe {
        buddymalloc::init::ensure_initialized();
        let a = buddymalloc::init::allocator();
        let meta = a.size_meta_data();

        let payload = 100;
        let mut granule = 128;
        while granule < payload + meta {
            granule *= 2;
        }

        // two adjacent blocks of the same order at the bottom of the arena
        let p1 = a.malloc(payload);
        let p2 = a.malloc(payload);
        assert!(!p1.is_null() && !p2.is_null());
        assert_eq!(p2 as usize, p1 as usize + granule);

        for i in 0..payload {
            *p1.add(i) = (i % 251) as u8;
        }

        // release the buddy; the next level's neighbour is still free from
        // the split ladder, so p1 can climb two orders without moving
        a.free(p2);

        let free_before = a.num_free_blocks();
        let grown_payload = 4 * granule - meta;
        let q = a.realloc(p1, grown_payload);
        assert_eq!(q, p1, "lowest-address block must grow in place");
        // two neighbours were consumed: the order-k buddy and the
        // order-(k+1) ladder block
        assert_eq!(a.num_free_blocks(), free_before - 2);
        for i in 0..payload {
            assert_eq!(*q.add(i), (i % 251) as u8, "payload lost at offset {}", i);
        }
        // the grown block is writable to its full new extent
        *q.add(grown_payload - 1) = 0x77;

        // same size again is a pure no-op
        let blocks = a.num_allocated_blocks();
        let q2 = a.realloc(q, grown_payload);
        assert_eq!(q2, q);
        assert_eq!(a.num_allocated_blocks(), blocks);

        // -------------------------------------------------------------------
        // an in-use buddy makes in-place growth infeasible: the block
        // relocates and the old one is released
        // -------------------------------------------------------------------
        let r1 = a.malloc(payload);
        let r2 = a.malloc(payload);
        assert!(!r1.is_null() && !r2.is_null());
        assert_eq!(r2 as usize, r1 as usize + granule);
        for i in 0..payload {
            *r1.add(i) = 0xC3;
        }

        let free_before = a.num_free_blocks();
        let moved = a.realloc(r1, 4 * granule);
        assert!(!moved.is_null());
        assert_ne!(moved, r1, "blocked buddy chain must force relocation");
        for i in 0..payload {
            assert_eq!(*moved.add(i), 0xC3);
        }
        // r1's old block went back to a free list (its buddy r2 is still
        // in use, so it cannot merge away)
        assert!(a.num_free_blocks() > free_before - 2);

        a.free(moved);
        a.free(r2);
        a.free(q);
    }
}
