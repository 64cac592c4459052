use std::env;
use std::path::PathBuf;

use anyhow::Result;
use criterion::*;
use glob::{glob_with, MatchOptions};
use ndarray::Array2;

use iris::detect::detect_plate_edges;
use iris::grid::HeatMap;

fn synthetic_plate(rows: usize, cols: usize) -> HeatMap {
    HeatMap::new(Array2::from_shape_fn((rows, cols), |(y, x)| {
        if (rows / 10..rows * 9 / 10).contains(&y) && (cols / 10..cols * 9 / 10).contains(&x) {
            80.0
        } else {
            20.0
        }
    }))
}

fn get_samples(key: &'static str) -> Result<Vec<PathBuf>> {
    let base = env::var(key)?;
    let mut opts = MatchOptions::new();
    opts.case_sensitive = false;
    let samples: Vec<_> = glob_with(&format!("{base}/**/*.csv"), opts)?
        .into_iter()
        .take(5)
        .map(|r| Result::Ok(r?))
        .collect::<Result<_>>()?;
    Ok(samples)
}

fn detection(c: &mut Criterion) {
    c.bench_function("plate_edges_synthetic", |b| {
        let map = synthetic_plate(480, 640);
        b.iter(|| detect_plate_edges(&map, 80).unwrap())
    });

    c.bench_function("csv_parse", |b| {
        let samples = get_samples("IRIS_SAMPLES").expect("samples");
        b.iter(|| {
            for path in samples.iter() {
                HeatMap::from_csv_path(path).unwrap();
            }
        })
    });
}

criterion_group! {
    name = detect;
    config = Criterion::default().sample_size(10);
    targets = detection
}

criterion_main!(detect);
