use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rcss_syntax::{parse, Edit, ReparseOutcome};
use rcss_syntax_bench::{generate_stylesheet, nth_offset};

pub fn full_parse(c: &mut Criterion) {
    let text = generate_stylesheet(1000);
    c.bench_function("full parse", |b| b.iter(|| parse(black_box(&text))));
}

pub fn token_reparse(c: &mut Criterion) {
    let text = generate_stylesheet(1000);
    let tree = parse(&text);
    let start = nth_offset(&text, "color: red", 100).expect("generated text") + "color: ".len();
    let edit = Edit::new(start, start + "red".len(), start + "blue".len());
    let mut new_text = text.clone();
    new_text.replace_range(start..start + "red".len(), "blue");
    assert_eq!(
        rcss_syntax::row_parser::reparsing::reparse(&tree, &edit, &new_text, &Default::default()).1,
        ReparseOutcome::Token
    );
    c.bench_function("token reparse", |b| {
        b.iter(|| tree.reparse(black_box(&edit), black_box(&new_text)))
    });
}

pub fn block_reparse(c: &mut Criterion) {
    let text = generate_stylesheet(1000);
    let tree = parse(&text);
    let start = nth_offset(&text, "color: red;", 100).expect("generated text") + "color: red;".len();
    let insert = " background: blue;";
    let edit = Edit::new(start, start, start + insert.len());
    let mut new_text = text.clone();
    new_text.insert_str(start, insert);
    assert_eq!(
        rcss_syntax::row_parser::reparsing::reparse(&tree, &edit, &new_text, &Default::default()).1,
        ReparseOutcome::Block
    );
    c.bench_function("block reparse", |b| {
        b.iter(|| tree.reparse(black_box(&edit), black_box(&new_text)))
    });
}

criterion_group!(benches, full_parse, token_reparse, block_reparse);
criterion_main!(benches);
