//! Benchmark for storyboard compilation.

use criterion::{BenchmarkId, Criterion, Throughput};
use serde_json::{Value, json};
use storyboard_rs::{
    chart::{Chart, ChartNote, NoteType},
    config::default_config,
    ids::SequentialIds,
    storyboard::Storyboard,
    unit::Viewport,
};

fn chart(notes: i32) -> Chart {
    let notes = (0..notes)
        .map(|id| {
            let start = id as f32 * 0.25;
            let kind = NoteType::ALL[id as usize % NoteType::ALL.len()];
            ChartNote::tap(id, kind, start - 1.0, start)
        })
        .collect();
    Chart::new(notes).expect("note ids are unique")
}

fn storyboard_source(objects: usize) -> String {
    let texts: Vec<Value> = (0..objects)
        .map(|index| {
            json!({
                "template": "pop",
                "text": format!("line {index}"),
                "time": [format!("start:{index}"), format!("end:{index}:1")],
                "x": "stagex:400",
                "states": [{"add_time": 0.5, "dx": 20}, {"relative_time": 2, "destroy": true}],
            })
        })
        .collect();
    json!({
        "templates": {"pop": {"opacity": 0, "states": [{"add_time": 0.1, "opacity": 1}]}},
        "texts": texts,
        "note_controllers": [{
            "note": {"type": [0, 1, 5]},
            "time": "intro:$note",
            "override_color": true,
            "color": "#ff8800",
            "states": [{"time": "start:$note", "color": "white"}],
        }],
        "triggers": [{"type": "combo", "combo": 50, "spawn": ["line 0"]}],
    })
    .to_string()
}

fn bench_compile_storyboard(c: &mut Criterion) {
    let viewport = Viewport::default();
    let mut group = c.benchmark_group("compile_storyboard");

    for objects in [10, 100, 1000] {
        let chart = chart(objects as i32 + 1);
        let source = storyboard_source(objects);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(objects), &source, |b, source| {
            b.iter(|| {
                Storyboard::load(
                    std::hint::black_box(source),
                    &chart,
                    &viewport,
                    default_config(),
                    SequentialIds::default(),
                )
            });
        });
    }

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default();
    bench_compile_storyboard(&mut criterion);
}
