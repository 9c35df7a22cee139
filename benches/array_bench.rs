use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use parray::{Int32Codec, PersistentArray, PersistentArrayConfigBuilder};
use tempfile::NamedTempFile;

const LENGTH: i64 = 10_000;

fn bench_sequential_set(c: &mut Criterion) {
    c.bench_function("set sequential, unchunked", |b| {
        b.iter_batched(
            || {
                let tmp = NamedTempFile::new().unwrap();
                let path = tmp.path().to_path_buf();
                drop(tmp);
                let config = PersistentArrayConfigBuilder::new(&path).build().unwrap();
                let array = PersistentArray::create(LENGTH, Box::new(Int32Codec), config).unwrap();
                (array, path)
            },
            |(mut array, path)| {
                for i in 0..LENGTH {
                    array.set(i, i as i32).unwrap();
                }
                array.close().unwrap();
                let _ = std::fs::remove_file(&path);
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_sequential_set_chunked(c: &mut Criterion) {
    c.bench_function("set sequential, chunked(256)", |b| {
        b.iter_batched(
            || {
                let tmp = NamedTempFile::new().unwrap();
                let path = tmp.path().to_path_buf();
                drop(tmp);
                let config = PersistentArrayConfigBuilder::new(&path)
                    .write_chunked(256)
                    .memory_size(512)
                    .build()
                    .unwrap();
                let array = PersistentArray::create(LENGTH, Box::new(Int32Codec), config).unwrap();
                (array, path)
            },
            |(mut array, path)| {
                for i in 0..LENGTH {
                    array.set(i, i as i32).unwrap();
                }
                array.close().unwrap();
                let _ = std::fs::remove_file(&path);
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_random_access_get(c: &mut Criterion) {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path().to_path_buf();
    drop(tmp);
    {
        let config = PersistentArrayConfigBuilder::new(&path).build().unwrap();
        let mut array = PersistentArray::create(LENGTH, Box::new(Int32Codec), config).unwrap();
        array.fill(1).unwrap();
        array.close().unwrap();
    }

    c.bench_function("get with small window, scattered indices", |b| {
        let config = PersistentArrayConfigBuilder::new(&path)
            .memory_size(64)
            .build()
            .unwrap();
        let mut array = PersistentArray::open(Box::new(Int32Codec), config, &[]).unwrap();
        let mut i = 0i64;
        b.iter(|| {
            // A large odd stride relative to LENGTH keeps hitting fresh
            // slots, exercising the cache-miss/load path rather than hits.
            i = (i + 997) % LENGTH;
            array.get(i).unwrap()
        });
        array.close().unwrap();
    });

    let _ = std::fs::remove_file(&path);
}

criterion_group!(
    benches,
    bench_sequential_set,
    bench_sequential_set_chunked,
    bench_random_access_get
);
criterion_main!(benches);
