//! Benchmarks for the scaleflow resize pipeline.
//!
//! Run with: cargo bench -p scaleflow-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat};
use scaleflow_core::engine::geometry;
use scaleflow_core::{
    derive_name, Fit, ImageEngine, ResizeConfig, ResizeEngine, ResizeInfo, ScaleTransform,
    ScaledFile, VirtualFile,
};
use std::io::Cursor;
use std::sync::Arc;

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buf, format)
        .expect("encode fixture");
    buf.into_inner()
}

fn benchmark_resize_png(c: &mut Criterion) {
    let engine = ImageEngine::default();
    let source = encoded(1920, 1080, ImageFormat::Jpeg);
    let config = ResizeConfig::new(500, 500).with_format("png");

    c.bench_function("resize_1080p_to_png_500", |b| {
        b.iter(|| {
            let _ = engine.resize(black_box(&source), black_box(&config));
        })
    });
}

fn benchmark_resize_cover(c: &mut Criterion) {
    let engine = ImageEngine::default();
    let source = encoded(1920, 1080, ImageFormat::Png);
    let config = ResizeConfig::new(256, 256)
        .with_fit(Fit::Cover)
        .with_format("jpeg");

    c.bench_function("resize_1080p_cover_256_jpeg", |b| {
        b.iter(|| {
            let _ = engine.resize(black_box(&source), black_box(&config));
        })
    });
}

fn benchmark_read_metadata(c: &mut Criterion) {
    let engine = ImageEngine::default();
    let source = encoded(1920, 1080, ImageFormat::Jpeg);

    c.bench_function("read_metadata", |b| {
        b.iter(|| {
            let _ = engine.read_metadata(black_box(&source));
        })
    });
}

fn benchmark_geometry(c: &mut Criterion) {
    c.bench_function("geometry_plan_inside", |b| {
        b.iter(|| {
            geometry::plan(
                black_box((4032, 3024)),
                black_box((Some(500), Some(500))),
                Fit::Inside,
                false,
            )
        })
    });
}

fn benchmark_derive_name(c: &mut Criterion) {
    let scaled = ScaledFile::new(
        VirtualFile::new("photos/2024/bar.xyz.jpg", b"x".to_vec()),
        ResizeInfo {
            format: "png".to_string(),
            width: 500,
            height: 375,
            size: 1,
        },
    );
    let config = ResizeConfig::new(500, 500).with_format("png");

    c.bench_function("derive_name", |b| {
        b.iter(|| derive_name(black_box(&scaled), black_box(&config)))
    });
}

fn benchmark_transform(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let source = encoded(800, 600, ImageFormat::Jpeg);
    let configs = vec![
        ResizeConfig::new(400, 400).with_format("png"),
        ResizeConfig::new(200, 200).with_format("jpeg"),
        ResizeConfig::new(100, 100),
    ];

    c.bench_function("transform_three_sizes", |b| {
        b.iter(|| {
            rt.block_on(async {
                let engine: Arc<dyn ResizeEngine> = Arc::new(ImageEngine::default());
                let transform = ScaleTransform::with_configs(engine, configs.clone())
                    .expect("valid configs");
                let (input, handle) = transform.spawn(4);
                let file = VirtualFile::new("bench.jpg", source.clone());
                let _ = input.send(file.into()).await;
                drop(input);
                handle.collect().await.expect("transform task")
            })
        })
    });
}

criterion_group!(
    benches,
    benchmark_resize_png,
    benchmark_resize_cover,
    benchmark_read_metadata,
    benchmark_geometry,
    benchmark_derive_name,
    benchmark_transform,
);
criterion_main!(benches);
