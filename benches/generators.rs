use criterion::{criterion_group, criterion_main, Criterion};
use tiled_mazes::{
    block::{Block, Borders},
    cells::CompassPrimary,
    config::MazeConfig,
    maze::Maze,
    units::{Height, Width},
    utils,
};

fn bench_wilson_block_32(c: &mut Criterion) {
    let mut rng = utils::seeded_rng(1);
    c.bench_function("wilson_block_32", move |b| {
        b.iter(|| {
            let mut block = Block::new(Width(32), Height(32)).unwrap();
            block.generate(&Borders::none(), &mut rng).unwrap()
        })
    });
}

fn bench_wilson_block_32_closed_spaces(c: &mut Criterion) {
    let mut rng = utils::seeded_rng(2);
    c.bench_function("wilson_block_32_closed_spaces", move |b| {
        b.iter(|| {
            let mut block = Block::with_closed_spaces(Width(32), Height(32), &mut rng).unwrap();
            block.generate(&Borders::none(), &mut rng).unwrap()
        })
    });
}

fn bench_maze_5(c: &mut Criterion) {
    let mut seed = 0;
    c.bench_function("maze_5", move |b| {
        b.iter(|| {
            seed += 1;
            Maze::new(MazeConfig { seed: Some(seed), ..MazeConfig::new(5, 5) }).unwrap()
        })
    });
}

fn bench_maze_16_shift(c: &mut Criterion) {
    let mut maze = Maze::new(MazeConfig { seed: Some(3), ..MazeConfig::new(16, 16) }).unwrap();
    c.bench_function("maze_16_shift", move |b| {
        b.iter(|| maze.shift(CompassPrimary::East).unwrap())
    });
}

criterion_group!(
    benches,
    bench_wilson_block_32,
    bench_wilson_block_32_closed_spaces,
    bench_maze_5,
    bench_maze_16_shift
);
criterion_main!(benches);
