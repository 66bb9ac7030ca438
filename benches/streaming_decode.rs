//! Benchmarks for the streaming decoder and the keep-alive codec
//!
//! This benchmark measures:
//! - NDJSON decode throughput for a typical generate stream
//! - The cost of small network chunks (values split across reads)
//! - Duration encode/decode

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ollama_lib_rust::pipeline::JsonStreamDecoder;
use ollama_lib_rust::types::GenerateResponse;
use ollama_lib_rust::{decode_duration, encode_duration};
use std::time::Duration;

fn generate_stream_body(chunks: usize) -> String {
    let mut body = String::new();
    for i in 0..chunks {
        body.push_str(&format!(
            r#"{{"model":"llama3.2:1b","created_at":"2024-10-01T08:00:00.{i:06}Z","response":" token{i}","done":false}}"#
        ));
        body.push('\n');
    }
    body.push_str(
        r#"{"model":"llama3.2:1b","created_at":"2024-10-01T08:00:01Z","response":"","done":true,"context":[1,2,3],"total_duration":5043500667,"load_duration":5025959,"prompt_eval_count":26,"prompt_eval_duration":325953000,"eval_count":290,"eval_duration":4709213000}"#,
    );
    body.push('\n');
    body
}

fn decode_all(body: &[u8], chunk_size: usize) -> usize {
    let mut decoder = JsonStreamDecoder::new();
    let mut count = 0;
    for chunk in body.chunks(chunk_size) {
        decoder.feed(chunk);
        while let Some(item) = decoder.decode_next::<GenerateResponse>() {
            item.unwrap();
            count += 1;
        }
    }
    while let Some(item) = decoder.decode_eof::<GenerateResponse>() {
        item.unwrap();
        count += 1;
    }
    count
}

fn bench_ndjson_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ndjson_decode");
    let body = generate_stream_body(256);
    group.throughput(Throughput::Bytes(body.len() as u64));

    group.bench_function("whole_body", |b| {
        b.iter(|| decode_all(black_box(body.as_bytes()), body.len()))
    });

    // typical HTTP chunk sizes split values mid-object
    for chunk_size in [64usize, 1024, 8192] {
        group.bench_function(format!("chunked_{chunk_size}"), |b| {
            b.iter(|| decode_all(black_box(body.as_bytes()), chunk_size))
        });
    }

    group.finish();
}

fn bench_duration_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("duration_codec");
    let d = Duration::from_secs(2 * 86_400 + 5 * 3_600 + 30 * 60 + 15);

    group.bench_function("encode", |b| b.iter(|| encode_duration(black_box(d))));
    group.bench_function("decode", |b| {
        b.iter(|| decode_duration(black_box("2d5h30m15s")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_ndjson_decode, bench_duration_codec);
criterion_main!(benches);
