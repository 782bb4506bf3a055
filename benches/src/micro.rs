/// Microbenchmarks for buddymalloc.
///
/// Measures operation latency through the public Rust API on a single
/// thread, which is the allocator's contract. Run with
/// `cargo run --release -p buddymalloc-benches --bin micro`.
use std::hint::black_box;
use std::time::Instant;

unsafe fn alloc() -> &'static buddymalloc::BuddyAllocator {
    buddymalloc::init::ensure_initialized();
    buddymalloc::init::allocator()
}

/// Measure malloc/free latency for a given size, N iterations.
fn bench_malloc_free(size: usize, iterations: usize) -> f64 {
    unsafe {
        let a = alloc();
        // Warmup
        for _ in 0..1000 {
            let ptr = a.malloc(black_box(size));
            assert!(!ptr.is_null());
            std::ptr::write_bytes(ptr, 0xAB, size.min(64));
            a.free(black_box(ptr));
        }
        let start = Instant::now();
        for _ in 0..iterations {
            let ptr = a.malloc(black_box(size));
            std::ptr::write_bytes(ptr, 0xAB, size.min(64));
            a.free(black_box(ptr));
        }
        start.elapsed().as_nanos() as f64 / iterations as f64
    }
}

/// Measure calloc/free latency.
fn bench_calloc_free(size: usize, iterations: usize) -> f64 {
    unsafe {
        let a = alloc();
        for _ in 0..1000 {
            let ptr = a.calloc(black_box(1), black_box(size));
            a.free(black_box(ptr));
        }
        let start = Instant::now();
        for _ in 0..iterations {
            let ptr = a.calloc(black_box(1), black_box(size));
            a.free(black_box(ptr));
        }
        start.elapsed().as_nanos() as f64 / iterations as f64
    }
}

/// Measure a grow-shrink realloc cycle.
fn bench_realloc_cycle(small: usize, big: usize, iterations: usize) -> f64 {
    unsafe {
        let a = alloc();
        let start = Instant::now();
        let mut ptr = a.malloc(black_box(small));
        for _ in 0..iterations {
            ptr = a.realloc(black_box(ptr), black_box(big));
            ptr = a.realloc(black_box(ptr), black_box(small));
        }
        a.free(ptr);
        start.elapsed().as_nanos() as f64 / (iterations * 2) as f64
    }
}

fn main() {
    const ITERS: usize = 200_000;

    println!("buddymalloc micro-latency (ns/op, single thread)");
    println!("{:<24} {:>10}", "benchmark", "ns/op");

    for &size in &[16usize, 64, 128, 1024, 16 * 1024, 100 * 1024] {
        let ns = bench_malloc_free(size, ITERS);
        println!("{:<24} {:>10.1}", format!("malloc_free/{}", size), ns);
    }

    // past the largest granule every cycle is an mmap/munmap pair
    let ns = bench_malloc_free(256 * 1024, 20_000);
    println!("{:<24} {:>10.1}", "malloc_free/mapped", ns);

    for &size in &[64usize, 4096] {
        let ns = bench_calloc_free(size, ITERS);
        println!("{:<24} {:>10.1}", format!("calloc_free/{}", size), ns);
    }

    let ns = bench_realloc_cycle(100, 3000, 100_000);
    println!("{:<24} {:>10.1}", "realloc_cycle/100:3000", ns);
}
