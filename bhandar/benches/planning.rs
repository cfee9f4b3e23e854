//! Benchmark path planning and slot allocation.

use bhandar::{AStarPlanner, BoxSpec, Footprint, GridCell, Rack, SlotAllocator};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Rack with 2x2 boxes on every other block, leaving aisles between them.
fn cluttered_rack(size: usize) -> Rack {
    let mut rack = Rack::new(size, size);
    let Ok(footprint) = Footprint::new(2, 2) else {
        return rack;
    };
    for row in (0..size.saturating_sub(2)).step_by(3) {
        for col in (1..size.saturating_sub(1)).step_by(3) {
            let _ = rack.place(BoxSpec::new(footprint, None), GridCell::new(row, col));
        }
    }
    rack
}

fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar");
    let planner = AStarPlanner::new();

    for size in [10usize, 20, 40].iter() {
        let empty = Rack::new(*size, *size);
        let cluttered = cluttered_rack(*size);
        let start = GridCell::new(size - 1, 0);
        let goal = GridCell::new(0, size - 1);

        group.bench_with_input(BenchmarkId::new("empty", size), size, |b, _| {
            b.iter(|| black_box(planner.shortest_path(empty.grid(), black_box(start), goal)))
        });
        group.bench_with_input(BenchmarkId::new("cluttered", size), size, |b, _| {
            b.iter(|| black_box(planner.shortest_path(cluttered.grid(), black_box(start), goal)))
        });
    }

    group.finish();
}

fn bench_slot_allocation(c: &mut Criterion) {
    let allocator = SlotAllocator::new();
    let rack = cluttered_rack(20);
    let origin = GridCell::new(19, 0);

    for (length, width) in [(1u32, 1u32), (3, 2), (5, 5)] {
        let Ok(footprint) = Footprint::new(length, width) else {
            continue;
        };
        c.bench_function(&format!("nearest_slot_{}x{}", length, width), |b| {
            b.iter(|| black_box(allocator.find_nearest_free_slot(&rack, black_box(footprint), origin)))
        });
    }
}

criterion_group!(benches, bench_astar, bench_slot_allocation);
criterion_main!(benches);
