use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use micro_http_response::codec::ResponseDecoder;
use micro_http_response::parser::{IgnoreHandler, ResponseParser};
use micro_http_response::protocol::Response;
use tokio_util::codec::Decoder;

const SIMPLE_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Server: bench\r\n\
    Content-Type: text/plain\r\n\
    Content-Length: 12\r\n\
    \r\n\
    Hello World!";

const CHUNKED_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Server: bench\r\n\
    Transfer-Encoding: chunked\r\n\
    \r\n\
    6\r\nHello \r\n\
    6\r\nWorld!\r\n\
    0\r\n\
    \r\n";

fn feed_whole(data: &[u8]) {
    let mut parser = ResponseParser::new(IgnoreHandler);
    black_box(parser.feed(data));
    assert!(parser.is_done() && !parser.is_error());
}

fn feed_bytewise(data: &[u8]) {
    let mut parser = ResponseParser::new(IgnoreHandler);
    for byte in data {
        black_box(parser.feed(std::slice::from_ref(byte)));
    }
    assert!(parser.is_done() && !parser.is_error());
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");

    for (name, data) in [("simple", SIMPLE_RESPONSE), ("chunked", CHUNKED_RESPONSE)] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("whole", name), data, |b, data| b.iter(|| feed_whole(data)));
        group.bench_with_input(BenchmarkId::new("bytewise", name), data, |b, data| b.iter(|| feed_bytewise(data)));
    }

    group.finish();
}

fn bench_collect_response(c: &mut Criterion) {
    c.bench_function("collect_response", |b| {
        b.iter(|| black_box(Response::parse(SIMPLE_RESPONSE).unwrap()));
    });
}

fn bench_response_decoder(c: &mut Criterion) {
    c.bench_function("decode_chunked_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::new();
            let mut bytes = BytesMut::from(CHUNKED_RESPONSE);
            while let Some(message) = decoder.decode(&mut bytes).unwrap() {
                black_box(message);
            }
        });
    });
}

criterion_group!(benches, bench_parser, bench_collect_response, bench_response_decoder);
criterion_main!(benches);
