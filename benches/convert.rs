use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jisconv::detection::EncodingDetector;
use jisconv::{Encoding, Input, Translator};

const SAMPLE: &str = "このテキストは JIS で書かれています。ﾆﾎﾝｺﾞ 日本語の文章, ASCII text 123.\n";

fn sample_text(size: usize) -> String {
    let mut text = String::with_capacity(size + SAMPLE.len());
    while text.len() < size {
        text.push_str(SAMPLE);
    }
    text
}

fn encoded(text: &str, to: Encoding) -> Vec<u8> {
    Translator::new(Encoding::UTF8, to).convert(text.as_bytes())
}

fn bench_japanese_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("japanese_pairs");

    for size in [1024, 16384, 262144].iter() {
        let sjis = encoded(&sample_text(*size), Encoding::SJIS);
        group.throughput(Throughput::Bytes(sjis.len() as u64));

        for to in [Encoding::EUCJP, Encoding::JIS] {
            let translator = Translator::new(Encoding::SJIS, to);
            group.bench_with_input(
                BenchmarkId::new(format!("SJIS->{}", to.name()), size),
                &sjis,
                |b, data| b.iter(|| translator.convert(black_box(data))),
            );
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_to_utf8");

    for size in [1024, 16384, 262144].iter() {
        let text = sample_text(*size);
        for from in [Encoding::SJIS, Encoding::EUCJP, Encoding::JIS] {
            let data = encoded(&text, from);
            let translator = Translator::new(from, Encoding::UTF8);
            group.throughput(Throughput::Bytes(data.len() as u64));
            group.bench_with_input(BenchmarkId::new(from.name(), size), &data, |b, data| {
                b.iter(|| translator.convert(black_box(data)))
            });
        }
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_from_units");

    for size in [1024, 16384, 262144].iter() {
        let units: Vec<u16> = sample_text(*size).encode_utf16().collect();
        group.throughput(Throughput::Elements(units.len() as u64));
        for to in [Encoding::SJIS, Encoding::EUCJP, Encoding::UTF16, Encoding::UTF32] {
            let translator = Translator::new(Encoding::UNICODE, to);
            group.bench_with_input(BenchmarkId::new(to.name(), size), &units, |b, units| {
                b.iter(|| translator.translate(Input::Units(black_box(units))))
            });
        }
    }
    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let detector = EncodingDetector::new();
    let mut group = c.benchmark_group("detect");

    let text = sample_text(65536);
    for encoding in [Encoding::UTF8, Encoding::EUCJP, Encoding::SJIS] {
        let data = encoded(&text, encoding);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(encoding.name()), &data, |b, data| {
            b.iter(|| detector.detect(black_box(data.as_slice())))
        });
    }
    group.finish();
}

fn bench_code_to_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_to_string");

    for size in [1024, 262144].iter() {
        let units = jisconv::text::string_to_code(&sample_text(*size));
        group.throughput(Throughput::Elements(units.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &units, |b, units| {
            b.iter(|| jisconv::text::code_to_string(black_box(units)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_japanese_pairs,
    bench_decode,
    bench_encode,
    bench_detect,
    bench_code_to_string
);
criterion_main!(benches);
