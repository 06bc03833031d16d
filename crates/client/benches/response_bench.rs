use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use micro_http_client::head::{parse_headers, parse_protocol_version, split_raw};

const RAW: &[u8] = b"HTTP/1.1 200 OK\r\n\
Date: Mon, 19 Oct 2026 08:00:00 GMT\r\n\
Content-Type: text/html; charset=UTF-8\r\n\
Content-Length: 13\r\n\
Cache-Control: max-age=604800\r\n\
Set-Cookie: a=1\r\n\
Set-Cookie: b=2\r\n\
Server: micro\r\n\
\r\n\
Hello World!\n";

fn header_size() -> usize {
    RAW.windows(4).position(|w| w == b"\r\n\r\n").map_or(RAW.len(), |p| p + 4)
}

fn bench_split_raw(c: &mut Criterion) {
    let raw = Bytes::from_static(RAW);
    let size = header_size();

    c.bench_function("split_raw", |b| {
        b.iter(|| black_box(split_raw(black_box(&raw), size)));
    });
}

fn bench_parse_head(c: &mut Criterion) {
    let head = std::str::from_utf8(&RAW[..header_size()]).unwrap();

    c.bench_function("parse_protocol_version", |b| {
        b.iter(|| black_box(parse_protocol_version(black_box(head))));
    });

    c.bench_function("parse_headers", |b| {
        b.iter(|| black_box(parse_headers(black_box(head))));
    });
}

criterion_group!(benches, bench_split_raw, bench_parse_head);
criterion_main!(benches);
