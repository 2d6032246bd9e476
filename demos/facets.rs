use std::collections::HashMap;

use data_matrix::{DataMatrix, EmptyPolicy};
use tracing::info;
use tracing_subscriber::EnvFilter;

const RECORDS: i64 = 100_000;

struct Butterfly {
    habitat: &'static str,
    life: u16,
}

fn records() -> HashMap<i64, Butterfly> {
    (1..=RECORDS)
        .map(|id| {
            let habitat = if id % 3 == 0 { "Asia" } else { "Europe" };
            let life = (id % 7) as u16 + 1;
            (id, Butterfly { habitat, life })
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data = records();
    let mut ids: Vec<i64> = data.keys().copied().collect();
    ids.sort_unstable();

    let matrix = DataMatrix::new();
    matrix.mark_start();
    matrix.init("butterflies", ids.iter().copied());
    info!(micros = matrix.mark_finish(), records = RECORDS, "init");

    let asia = matrix.allocate_row_key();
    let long_lived = matrix.allocate_row_key();
    matrix.light_up(-1, asia);
    matrix.light_up(-1, long_lived);

    matrix.mark_start();
    let batch = data.iter().map(|(id, b)| {
        let mut keys = Vec::new();
        if b.habitat == "Asia" {
            keys.push(asia);
        }
        if b.life >= 5 {
            keys.push(long_lived);
        }
        (*id, keys)
    });
    matrix.light_up_batch(batch);
    info!(micros = matrix.mark_finish(), "light up batch");

    matrix.mark_start();
    let both = matrix.and_reduce(&[asia, long_lived], EmptyPolicy::ShortCircuit);
    let hits = matrix.resolve_ids(&both);
    info!(micros = matrix.mark_finish(), hits = hits.len(), "asia and long lived");

    matrix.mark_start();
    matrix.remove_points(ids.iter().take(10).copied());
    info!(micros = matrix.mark_finish(), "remove ten points");

    matrix.add_points([RECORDS + 1, RECORDS + 2]);
    let key = matrix.light_up(RECORDS + 1, 0);
    let (row, _) = matrix.get_row(key);
    info!(ids = ?matrix.resolve_ids(&row), coordinate = ?matrix.coordinate(RECORDS + 1), "reused hole");
}
