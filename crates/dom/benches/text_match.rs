//! Whole-document queries run once per recorded event; measure them on
//! pages of realistic size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dom::{DomArena, DomNode, DomRect, NodeId, SelectorFinder, TextMatch};

fn build_page(rows: usize) -> (DomArena, NodeId) {
    let mut arena = DomArena::with_capacity(rows * 4 + 8);
    let doc = arena.add_node(DomNode::new(0, 0, dom::NodeType::Document, "#document".into()));
    arena.set_root(doc).unwrap();
    let html = arena.append_child(doc, DomNode::element("HTML")).unwrap();
    let body = arena
        .append_child(
            html,
            DomNode::element("BODY").with_bounds(DomRect::new(0.0, 0.0, 1280.0, 800.0)),
        )
        .unwrap();
    let table = arena.append_child(body, DomNode::element("TABLE")).unwrap();

    let mut last = table;
    for i in 0..rows {
        let row = arena
            .append_child(table, DomNode::element("TR").with_attr("class", "row"))
            .unwrap();
        let cell = arena
            .append_child(
                row,
                DomNode::element("TD").with_bounds(DomRect::new(0.0, i as f64 * 20.0, 200.0, 20.0)),
            )
            .unwrap();
        arena
            .append_child(cell, DomNode::text(&format!("Order #{}", i)))
            .unwrap();
        last = cell;
    }
    (arena, last)
}

fn bench_text_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_match");
    for rows in [100usize, 1_000, 10_000] {
        let (arena, _) = build_page(rows);
        let needle = format!("Order #{}", rows - 1);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| TextMatch::resolve(black_box(&arena), black_box(&needle)).unwrap())
        });
    }
    group.finish();
}

fn bench_finder(c: &mut Criterion) {
    let mut group = c.benchmark_group("finder");
    for rows in [100usize, 1_000] {
        let (arena, target) = build_page(rows);
        let finder = SelectorFinder::new();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| finder.find(black_box(&arena), black_box(target)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_text_match, bench_finder);
criterion_main!(benches);
