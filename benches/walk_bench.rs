use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fsweep::Walker;
use std::hint::black_box;
use std::path::PathBuf;

/// Lays down a synthetic tree: `width` subdirectories each holding `files`
/// small regular files, plus a handful of loose files at the root.
fn build_tree(width: usize, files: usize) -> PathBuf {
    let root = std::env::temp_dir().join(format!("fsweep_bench_{width}x{files}"));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    for d in 0..width {
        let sub = root.join(format!("dir{d:03}"));
        std::fs::create_dir(&sub).unwrap();
        for f in 0..files {
            std::fs::write(sub.join(format!("file{f:03}.dat")), b"payload").unwrap();
        }
    }
    for f in 0..8 {
        std::fs::write(root.join(format!("loose{f}.txt")), b"loose").unwrap();
    }
    root
}

fn bench_walk(c: &mut Criterion) {
    let root = build_tree(64, 16);
    let output = std::env::temp_dir().join("fsweep_bench_out.csv");

    let mut group = c.benchmark_group("walk");
    for workers in [1_usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let summary = Walker::init(&root, &output)
                        .max_workers(workers)
                        .run()
                        .unwrap();
                    black_box(summary.workers_spawned)
                });
            },
        );
    }
    group.bench_function("compressed", |b| {
        b.iter(|| {
            let summary = Walker::init(&root, &output)
                .max_workers(8)
                .compress(true)
                .run()
                .unwrap();
            black_box(summary.compressed)
        });
    });
    group.finish();

    let _ = std::fs::remove_dir_all(&root);
    let _ = std::fs::remove_file(&output);
}

criterion_group!(benches, bench_walk);
criterion_main!(benches);
