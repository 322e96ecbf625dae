use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sky_covariance::sky::lonlat_to_vec;
use sky_covariance::{
    decode, encode, invert, CovarianceBuilder, FilterKernel, InversionStrategy, PixelOrdering, PowerSpectrum,
    UnitVectorArray,
};

/// `n` roughly uniform points on a Fibonacci spiral.
fn lonlat_grid(n: usize, ordering: PixelOrdering) -> UnitVectorArray {
    let golden = 180.0 * (3.0 - 5.0_f64.sqrt());
    let vectors = (0..n)
        .map(|k| {
            let z = 1.0 - (2.0 * k as f64 + 1.0) / n as f64;
            lonlat_to_vec((golden * k as f64) % 360.0, z.asin().to_degrees())
        })
        .collect();
    UnitVectorArray::new(vectors, ordering).unwrap()
}

fn spectrum(lmax: usize) -> PowerSpectrum {
    PowerSpectrum::new((0..=lmax).map(|l| 1.0 / (l as f64 + 1.0)).collect()).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_build");
    group.sample_size(10);
    let cl = spectrum(250);
    for &n in &[64usize, 256] {
        let vectors = lonlat_grid(n, PixelOrdering::Ring);
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, vectors| {
            b.iter(|| {
                let cov = CovarianceBuilder::new(250)
                    .build(vectors, &cl, &FilterKernel::identity())
                    .unwrap();
                black_box(cov.dim())
            });
        });
    }
    group.finish();
}

fn bench_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_invert");
    group.sample_size(10);
    let vectors = lonlat_grid(256, PixelOrdering::Ring);
    let cov = CovarianceBuilder::new(250)
        .highpass(2)
        .build(&vectors, &spectrum(250), &FilterKernel::identity())
        .unwrap();
    for strategy in InversionStrategy::ALL {
        group.bench_function(strategy.as_str(), |b| {
            b.iter(|| black_box(invert(&cov, strategy).map(|inv| inv.dim())))
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let vectors = lonlat_grid(256, PixelOrdering::Ring);
    let cov = CovarianceBuilder::new(64)
        .build(&vectors, &spectrum(64), &FilterKernel::identity())
        .unwrap();
    let compact = encode(&cov);
    c.bench_function("compact_decode_256", |b| {
        b.iter(|| black_box(decode(&compact, PixelOrdering::Ring).map(|m| m.dim())))
    });
}

criterion_group!(benches, bench_build, bench_invert, bench_codec);
criterion_main!(benches);
