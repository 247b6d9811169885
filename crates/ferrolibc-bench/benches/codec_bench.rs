//! Codec and path normalization benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ferrolibc_core::escape::{UnescapeMode, escape, unescape_bytes};
use ferrolibc_core::mode::{HumanModeStyle, humanmode, machinemode};
use ferrolibc_core::path::cleanname;
use ferrolibc_core::size::{SizeMode, humansize, machinesize};

fn bench_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("mode");
    for input in ["755", "u+x,go-w", "u=rwx,go=rx", "-rwxr-xr-x"] {
        group.bench_with_input(BenchmarkId::new("machinemode", input), input, |b, s| {
            b.iter(|| black_box(machinemode(black_box(s))));
        });
    }
    group.bench_function("humanmode", |b| {
        b.iter(|| black_box(humanmode(black_box(0o4755), HumanModeStyle::WithType)));
    });
    group.finish();
}

fn bench_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("size");
    for input in ["4096", "1.5GiB", "2M + 512K", "1,048,576"] {
        group.bench_with_input(BenchmarkId::new("machinesize", input), input, |b, s| {
            b.iter(|| black_box(machinesize(black_box(s), SizeMode::Decimal)));
        });
    }
    group.bench_function("humansize", |b| {
        b.iter(|| black_box(humansize(black_box(1_610_612_736), SizeMode::Binary)));
    });
    group.finish();
}

fn bench_cleanname(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanname");
    let cases: [(&str, String); 3] = [
        ("clean", "/usr/local/lib/x86_64-linux-gnu".to_string()),
        ("dotted", "/a/./b/../c//d/./e/../f/".to_string()),
        ("deep", "x/../".repeat(64) + "y"),
    ];
    for (label, path) in &cases {
        group.throughput(Throughput::Bytes(path.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), path, |b, p| {
            b.iter(|| {
                let mut buf = p.as_bytes().to_vec();
                cleanname(&mut buf);
                black_box(buf);
            });
        });
    }
    group.finish();
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");
    let plain = "plain ascii text without controls ".repeat(32);
    let controls = "tab\there\nbell\x07quote\"\x1b[0m".repeat(32);

    for (label, text) in [("plain", &plain), ("controls", &controls)] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("escape", label), text, |b, t| {
            b.iter(|| black_box(escape(black_box(t.as_bytes()), b'"')));
        });
        let escaped = escape(text.as_bytes(), b'"').unwrap_or_default();
        group.bench_with_input(BenchmarkId::new("unescape", label), &escaped, |b, e| {
            b.iter(|| black_box(unescape_bytes(black_box(e), UnescapeMode::empty())));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mode, bench_size, bench_cleanname, bench_escape);
criterion_main!(benches);
