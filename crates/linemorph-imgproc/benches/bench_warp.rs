use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use linemorph_image::Image;
use linemorph_imgproc::{
    parallel::ExecutionStrategy,
    warp::{field_warp, FieldWarpOptions, FieldWarpParams},
};
use linemorph_lines::{CorrespondenceSet, LineSegment};

fn feature_lines(num_lines: usize, width: f32, height: f32) -> CorrespondenceSet {
    let (source, dest): (Vec<_>, Vec<_>) = (0..num_lines)
        .map(|k| {
            let t = (k as f32 + 1.0) / (num_lines as f32 + 1.0);
            let source = LineSegment::from_coords(0.1 * width, t * height, 0.9 * width, t * height);
            let dest = LineSegment::from_coords(
                0.15 * width,
                t * height + 0.02 * height,
                0.85 * width,
                t * height - 0.02 * height,
            );
            (source, dest)
        })
        .unzip();

    CorrespondenceSet::new(&source, &dest).unwrap()
}

fn bench_field_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("FieldWarp");

    for (width, height) in [(256, 224), (512, 448)].iter() {
        for num_lines in [1, 8, 32] {
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let parameter_string = format!("{}x{}_{}lines", width, height, num_lines);

            let image_size = [*width, *height].into();
            let image = Image::<u8, 3>::new(image_size, vec![0u8; width * height * 3]).unwrap();
            let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();
            let set = feature_lines(num_lines, *width as f32, *height as f32);

            for (name, strategy) in [
                ("serial", ExecutionStrategy::Serial),
                ("par_rows", ExecutionStrategy::ParallelRows),
            ] {
                let options = FieldWarpOptions::default().with_strategy(strategy);
                group.bench_with_input(
                    BenchmarkId::new(name, &parameter_string),
                    &(&image, &output, &set),
                    |b, i| {
                        let (src, mut dst, set) = (i.0, i.1.clone(), i.2);
                        b.iter(|| {
                            field_warp(
                                black_box(src),
                                black_box(&mut dst),
                                black_box(set.pairs()),
                                black_box(&FieldWarpParams::default()),
                                black_box(&options),
                            )
                        })
                    },
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_field_warp);
criterion_main!(benches);
