use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use smartswitch_protocol::utils::crypto::{Crypto, SWITCH_KEY};

#[allow(clippy::unwrap_used)]
fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher");

    group.bench_function("key_schedule", |b| {
        b.iter(|| Crypto::new(black_box(SWITCH_KEY)).unwrap())
    });

    let crypto = Crypto::switch_default();
    for &size in &[36usize, 256, 1500] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("apply_{size}b"), |b| {
            b.iter_batched(
                || vec![0xA5u8; size],
                |mut data| {
                    crypto.apply_in_place(&mut data);
                    data
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cipher);
criterion_main!(benches);
