//! Protocol encoding/decoding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dashio_protocol::config::{ControlHeader, LineType, SliderCfg};
use dashio_protocol::{Decoder, Encoder};

fn encoder() -> Encoder {
    Encoder::new("bench-device", "Bench", "Bench Device")
}

/// A stream of `count` mixed device messages.
fn create_stream(count: usize) -> String {
    let encoder = encoder();
    let mut stream = String::new();
    for i in 0..count {
        let id = format!("C{}", i % 16);
        let line = match i % 4 {
            0 => encoder.slider(&id, i as i32),
            1 => encoder.button(&id, i % 2 == 0, "light", "Lamp"),
            2 => encoder.text_box(&id, "some status text"),
            _ => encoder.map(&id, "-43.5321", "172.6362", "depot"),
        };
        stream.push_str(&line);
    }
    stream
}

fn bench_encode_control(c: &mut Criterion) {
    let encoder = encoder();
    let mut group = c.benchmark_group("encode_control");
    group.throughput(Throughput::Elements(1));

    group.bench_function("slider", |b| {
        b.iter(|| black_box(encoder.slider(black_box("S1"), black_box(42))));
    });
    group.bench_function("button", |b| {
        b.iter(|| black_box(encoder.button("B1", true, "light", "Lamp")));
    });

    group.finish();
}

fn bench_encode_graph_line(c: &mut Criterion) {
    let encoder = encoder();
    let mut group = c.benchmark_group("encode_graph_line");

    for size in [10, 100, 1000] {
        let points: Vec<f32> = (0..size).map(|i| i as f32 * 0.5).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                black_box(encoder.graph_line_floats("G1", "L1", "temp", LineType::Line, "4", points))
            });
        });
    }

    group.finish();
}

fn bench_encode_config(c: &mut Criterion) {
    let encoder = encoder();
    let cfg = SliderCfg {
        header: ControlHeader {
            control_id: "S1".to_string(),
            parent_id: "DV01".to_string(),
            title: "Fan speed".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    let mut group = c.benchmark_group("encode_config");
    group.throughput(Throughput::Elements(1));
    group.bench_function("slider", |b| {
        b.iter(|| black_box(encoder.config(&cfg)));
    });
    group.finish();
}

fn bench_decode_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_stream");

    for count in [10, 100, 1000] {
        let stream = create_stream(count);

        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &stream, |b, stream| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                black_box(decoder.feed_str(stream))
            });
        });
    }

    group.finish();
}

fn bench_decode_fragmented(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_fragmented");
    let stream = create_stream(100);

    for chunk in [1, 16, 256] {
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                let mut decoded = 0;
                for piece in stream.as_bytes().chunks(chunk) {
                    decoded += decoder.feed_bytes(piece).len();
                }
                black_box(decoded)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_control,
    bench_encode_graph_line,
    bench_encode_config,
    bench_decode_stream,
    bench_decode_fragmented,
);

criterion_main!(benches);
