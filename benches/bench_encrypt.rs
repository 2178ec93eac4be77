use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use aead_bench::cipher::{CipherKind, KeySet};

fn encrypt_benchmark_func(c: &mut Criterion) {
    let keys = KeySet::generate();
    let mut group = c.benchmark_group("encrypt");
    for size in [16 * 1024, 1024 * 1024] {
        let plaintext = vec![0x5a_u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        for cipher in CipherKind::ALL {
            group.bench_with_input(BenchmarkId::new(cipher.name(), size), &plaintext, |b, pt| {
                b.iter(|| cipher.encrypt(keys.get(cipher), pt).unwrap());
            });
        }
    }
    group.finish();
}
criterion_group!(benches, encrypt_benchmark_func);
criterion_main!(benches);
