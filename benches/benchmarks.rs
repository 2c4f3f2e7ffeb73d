criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        building_rps_tree,
        building_kuhn_tree,
        building_leduc_tree,
        solving_rps_vanilla,
        solving_kuhn_discounted,
        solving_kuhn_external_sampling,
        extracting_kuhn_average_strategy,
        computing_kuhn_exploitability,
}

fn building_rps_tree(c: &mut criterion::Criterion) {
    c.bench_function("build the Rock-Paper-Scissors tree", |b| {
        b.iter(|| Tree::build(Rps::default()));
    });
}

fn building_kuhn_tree(c: &mut criterion::Criterion) {
    c.bench_function("build the Kuhn poker tree", |b| {
        b.iter(|| Tree::build(Kuhn::default()));
    });
}

fn building_leduc_tree(c: &mut criterion::Criterion) {
    c.bench_function("build the no-raise Leduc tree", |b| {
        b.iter(|| Tree::build(Leduc::default()));
    });
}

fn solving_rps_vanilla(c: &mut criterion::Criterion) {
    let tree = Tree::build(Rps::default());
    c.bench_function("1000 vanilla CFR iterations over RPS", |b| {
        b.iter(|| {
            let table = InfoTable::build(&tree);
            cfr::solve(&tree, &table, Variant::Vanilla, 1_000, 0.0);
        });
    });
}

fn solving_kuhn_discounted(c: &mut criterion::Criterion) {
    let tree = Tree::build(Kuhn::default());
    c.bench_function("1000 Discounted CFR iterations over Kuhn", |b| {
        b.iter(|| {
            let table = InfoTable::build(&tree);
            cfr::solve(&tree, &table, Variant::DCFR_DEFAULT, 1_000, 1e-6);
        });
    });
}

fn solving_kuhn_external_sampling(c: &mut criterion::Criterion) {
    let tree = Tree::build(Kuhn::default());
    c.bench_function("1000 external-sampling MCCFR iterations over Kuhn", |b| {
        b.iter(|| {
            let table = InfoTable::build(&tree);
            mccfr::solve(&tree, &table, Variant::Linear, Sampling::External, 1_000, None);
        });
    });
}

fn extracting_kuhn_average_strategy(c: &mut criterion::Criterion) {
    let tree = Tree::build(Kuhn::default());
    let table = InfoTable::build(&tree);
    cfr::solve(&tree, &table, Variant::Linear, 5_000, 1e-9);
    c.bench_function("extract the Kuhn average strategy", |b| {
        b.iter(|| AverageStrategy::extract(&tree, &table));
    });
}

fn computing_kuhn_exploitability(c: &mut criterion::Criterion) {
    let tree = Tree::build(Kuhn::default());
    let table = InfoTable::build(&tree);
    cfr::solve(&tree, &table, Variant::Linear, 5_000, 1e-9);
    let avg = AverageStrategy::extract(&tree, &table);
    c.bench_function("compute Kuhn exploitability against a near-equilibrium strategy", |b| {
        b.iter(|| response::exploitability::<Kuhn>(&tree, &avg));
    });
}

use cfr_core::cfr;
use cfr_core::games::kuhn::Kuhn;
use cfr_core::games::leduc::Leduc;
use cfr_core::games::rps::Rps;
use cfr_core::mccfr::{self, Sampling};
use cfr_core::response;
use cfr_core::strategy::AverageStrategy;
use cfr_core::table::InfoTable;
use cfr_core::tree::Tree;
use cfr_core::variant::Variant;
