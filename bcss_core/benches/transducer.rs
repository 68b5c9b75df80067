use bcss_core::{BcssConfig, Injector, RpmModel, transform_bytes};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

// Synthetic 5-axis finishing pass: B sweeps slowly, one move per line.
fn synth_program(lines: usize, crlf: bool) -> Vec<u8> {
    let nl: &[u8] = if crlf { b"\r\n" } else { b"\n" };
    let mut out = Vec::with_capacity(lines * 32);
    out.extend_from_slice(b"(FINISH PASS)");
    out.extend_from_slice(nl);
    out.extend_from_slice(b"G97S8000M03");
    out.extend_from_slice(nl);
    for i in 0..lines {
        let b = 10.0 + 60.0 * ((i as f64) / 4000.0).sin().abs();
        let line = format!("X{:.4}Y{:.4}B{b:.4}C0.", i as f64 * 0.01, -(i as f64) * 0.02);
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(nl);
    }
    out.extend_from_slice(b"M05");
    out.extend_from_slice(nl);
    out
}

fn bench_transform(c: &mut Criterion) {
    let cfg = BcssConfig::default();
    let mut group = c.benchmark_group("transform_bytes");
    for &(name, crlf) in &[("lf", false), ("crlf", true)] {
        let src = synth_program(100_000, crlf);
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| transform_bytes(black_box(&src), &cfg).unwrap())
        });
    }
    group.finish();
}

fn bench_injector_lines(c: &mut Criterion) {
    let cfg = BcssConfig::default();
    let lines: Vec<String> = (0..10_000)
        .map(|i| format!("X{i}Y0B{:.3}", 20.0 + (i % 600) as f64 * 0.1))
        .collect();
    c.bench_function("injector_10k_lines", |b| {
        b.iter_batched(
            || {
                let mut inj = Injector::new(RpmModel::new(&cfg));
                inj.process_line("G97S8000M03");
                inj
            },
            |mut inj| {
                for l in &lines {
                    black_box(inj.process_line(l));
                }
                inj.finalize();
                inj.into_stats()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_transform, bench_injector_lines);
criterion_main!(benches);
