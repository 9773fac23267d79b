use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_pivot::{from_str, json, to_string, CsvOptions, CsvSerializer, DocumentTree};

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product, \"{}\"", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn benchmark_json_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_write");

    for size in [10, 100, 1000].iter() {
        let items = products(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&items)))
        });
    }
    group.finish();
}

fn benchmark_json_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_parse");

    for size in [10, 100, 1000].iter() {
        let text = to_string(&products(*size)).unwrap();
        group.bench_with_input(BenchmarkId::new("value", size), &text, |b, text| {
            b.iter(|| json::parse(black_box(text)))
        });
        group.bench_with_input(BenchmarkId::new("typed", size), &text, |b, text| {
            b.iter(|| from_str::<Vec<Product>>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_lenient_input(c: &mut Criterion) {
    let text = "// settings\n{name: 'edge', /* inline */ limits: [10, 20, 30], nested: {a: true, b: null}}";

    c.bench_function("json_parse_lenient", |b| b.iter(|| json::parse(black_box(text))));
}

fn benchmark_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv");
    let writer = CsvSerializer::with_options(CsvOptions::new().with_write_keys(true));

    for size in [10, 100, 1000].iter() {
        let items = products(*size);
        group.bench_with_input(BenchmarkId::new("write", size), &items, |b, items| {
            b.iter(|| writer.write_to_string(black_box(items)))
        });

        let text = writer.write_to_string(&items).unwrap();
        group.bench_with_input(BenchmarkId::new("read", size), &text, |b, text| {
            b.iter(|| {
                let mut reader = CsvSerializer::new();
                reader.read_str::<Product>(black_box(text))
            })
        });
        group.bench_with_input(BenchmarkId::new("stream", size), &text, |b, text| {
            b.iter(|| {
                let mut reader = CsvSerializer::new();
                let records = reader.stream::<Product, _>(black_box(text.as_bytes())).unwrap();
                records.filter(Result::is_ok).count()
            })
        });
    }
    group.finish();
}

fn benchmark_document_ranges(c: &mut Criterion) {
    let text: String = (0..200).map(|i| format!("paragraph number {}\n", i)).collect();

    c.bench_function("document_cut_and_paste", |b| {
        b.iter(|| {
            let mut tree = DocumentTree::new();
            let doc = tree.document_from_text(&text);
            let cut = tree.remove_range(doc, black_box(1000), black_box(2000)).unwrap();
            tree.insert_range(doc, cut, 500).unwrap();
            tree.character_count(doc)
        })
    });

    c.bench_function("document_offset_lookup", |b| {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text(&text);
        let count = tree.character_count(doc);
        b.iter(|| {
            (0..count)
                .step_by(37)
                .filter_map(|offset| tree.descendant_at(doc, black_box(offset)).ok())
                .count()
        })
    });
}

criterion_group!(
    benches,
    benchmark_json_write,
    benchmark_json_parse,
    benchmark_lenient_input,
    benchmark_csv,
    benchmark_document_ranges
);
criterion_main!(benches);
