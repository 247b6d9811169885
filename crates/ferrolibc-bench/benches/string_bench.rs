//! String function benchmarks.
//!
//! Compares the slice-based scanners and copiers against the host libc on
//! the same NUL-terminated buffers. Set `FERROLIBC_BENCH_PIN=1` to pin the
//! benchmark thread to CPU 0.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ferrolibc_core::string::{memchr, memcpy, strcmp, strlen, strstr};

const SIZES: &[usize] = &[16, 64, 256, 1024, 4096, 65536];

#[derive(Default)]
struct BenchStats {
    samples_ns_per_op: Vec<f64>,
}

impl BenchStats {
    fn record(&mut self, iters: u64, dur: Duration) {
        self.samples_ns_per_op
            .push(dur.as_nanos() as f64 / iters.max(1) as f64);
    }

    fn report(&self, bench: &str, implementation: &str, size: usize) {
        let mut samples = self.samples_ns_per_op.clone();
        if samples.is_empty() {
            return;
        }
        samples.sort_by(|a, b| a.total_cmp(b));
        let p50 = samples[samples.len() / 2];
        let p99 = samples[((samples.len() - 1) as f64 * 0.99).round() as usize];
        println!(
            "STRING_BENCH bench={bench} impl={implementation} size={size} samples={} p50_ns_op={p50:.3} p99_ns_op={p99:.3}",
            samples.len()
        );
    }
}

fn maybe_pin_thread() {
    if std::env::var("FERROLIBC_BENCH_PIN").ok().as_deref() != Some("1") {
        return;
    }

    #[cfg(target_os = "linux")]
    unsafe {
        // SAFETY: cpu_set_t is plain data; a failed affinity call is only reported.
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(0, &mut set);
        let rc = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
        if rc != 0 {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            eprintln!("STRING_BENCH_META pinning_failed errno={errno}");
        } else {
            println!("STRING_BENCH_META pinned_to_cpu=0");
        }
    }
}

/// `size` filler bytes followed by a terminator.
fn cstring(size: usize, fill: u8) -> Vec<u8> {
    let mut s = vec![fill; size];
    s.push(0);
    s
}

fn timed(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    bench: &str,
    implementation: &str,
    size: usize,
    mut op: impl FnMut(),
) {
    let stats = RefCell::new(BenchStats::default());
    group.bench_function(BenchmarkId::new(implementation, size), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                op();
            }
            let dur = start.elapsed().max(Duration::from_nanos(1));
            stats.borrow_mut().record(iters, dur);
            dur
        });
    });
    stats.borrow().report(bench, implementation, size);
}

fn bench_strlen(c: &mut Criterion) {
    maybe_pin_thread();
    let mut group = c.benchmark_group("strlen");
    for &size in SIZES {
        let s = cstring(size, b'A');
        group.throughput(Throughput::Bytes(size as u64));

        timed(&mut group, "strlen", "ferrolibc", size, || {
            black_box(strlen(black_box(&s)));
        });
        timed(&mut group, "strlen", "libc", size, || {
            // SAFETY: `s` is NUL-terminated.
            black_box(unsafe { libc::strlen(black_box(s.as_ptr()).cast()) });
        });
    }
    group.finish();
}

fn bench_memchr(c: &mut Criterion) {
    let mut group = c.benchmark_group("memchr");
    for &size in SIZES {
        let mut hay = vec![b'a'; size];
        if let Some(last) = hay.last_mut() {
            *last = b'z';
        }
        group.throughput(Throughput::Bytes(size as u64));

        timed(&mut group, "memchr", "ferrolibc", size, || {
            black_box(memchr(black_box(&hay), b'z', size));
        });
        timed(&mut group, "memchr", "libc", size, || {
            // SAFETY: `hay` has `size` readable bytes.
            black_box(unsafe { libc::memchr(black_box(hay.as_ptr()).cast(), i32::from(b'z'), size) });
        });
    }
    group.finish();
}

fn bench_memcpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("memcpy");
    for &size in SIZES {
        let src = vec![0xABu8; size];
        let mut dst = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        timed(&mut group, "memcpy", "ferrolibc", size, || {
            black_box(memcpy(black_box(&mut dst), black_box(&src), size));
        });
        let mut dst = vec![0u8; size];
        timed(&mut group, "memcpy", "libc", size, || {
            // SAFETY: both buffers hold `size` bytes and do not overlap.
            black_box(unsafe {
                libc::memcpy(dst.as_mut_ptr().cast(), black_box(src.as_ptr()).cast(), size)
            });
        });
    }
    group.finish();
}

fn bench_strcmp(c: &mut Criterion) {
    let mut group = c.benchmark_group("strcmp");
    for &size in SIZES {
        let a = cstring(size, b'q');
        let mut b_str = a.clone();
        if size > 0 {
            b_str[size - 1] = b'r';
        }
        group.throughput(Throughput::Bytes(size as u64));

        timed(&mut group, "strcmp", "ferrolibc", size, || {
            black_box(strcmp(black_box(&a), black_box(&b_str)));
        });
        timed(&mut group, "strcmp", "libc", size, || {
            // SAFETY: both strings are NUL-terminated.
            black_box(unsafe { libc::strcmp(a.as_ptr().cast(), b_str.as_ptr().cast()) });
        });
    }
    group.finish();
}

fn bench_strstr(c: &mut Criterion) {
    let mut group = c.benchmark_group("strstr");
    let needle = b"needle\0";
    for &size in &SIZES[2..] {
        let mut hay = vec![b'n'; size];
        hay.extend_from_slice(needle);
        group.throughput(Throughput::Bytes(size as u64));

        timed(&mut group, "strstr", "ferrolibc", size, || {
            black_box(strstr(black_box(&hay), needle));
        });
        timed(&mut group, "strstr", "libc", size, || {
            // SAFETY: both strings are NUL-terminated.
            black_box(unsafe { libc::strstr(hay.as_ptr().cast(), needle.as_ptr().cast()) });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(100))
        .measurement_time(Duration::from_secs(2));
    targets = bench_strlen, bench_memchr, bench_memcpy, bench_strcmp, bench_strstr
);
criterion_main!(benches);
