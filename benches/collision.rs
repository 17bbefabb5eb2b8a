use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{DVec3, IVec3};
use voxwalk::{
    ActorState, BlockKind, VoxelWorld,
    physics::{CollisionResolver, Hull},
};

fn pen() -> VoxelWorld {
    let world = VoxelWorld::new(DVec3::new(0.5, 0.5, 5.0));
    world.fill_box(IVec3::new(-16, -16, 4), IVec3::new(16, 16, 4), BlockKind::Stone);
    for x in (-15..=15).step_by(3) {
        for y in (-15..=15).step_by(3) {
            if x != 0 || y != 0 {
                world.fill_box(IVec3::new(x, y, 5), IVec3::new(x, y, 6), BlockKind::Stone);
            }
        }
    }
    world
}

fn benchmark_resolve_step(c: &mut Criterion) {
    let world = pen();
    let resolver = CollisionResolver::new(Hull::default());

    c.bench_function("resolve_step_open", |b| {
        b.iter(|| {
            let mut state = ActorState::spawn(DVec3::new(1.5, 1.5, 5.0));
            black_box(resolver.resolve_step(&world, &mut state, black_box(DVec3::new(0.05, 0.05, -0.01))))
        })
    });

    c.bench_function("resolve_step_against_wall", |b| {
        b.iter(|| {
            let mut state = ActorState::spawn(DVec3::new(2.85, 3.5, 5.0));
            black_box(resolver.resolve_step(&world, &mut state, black_box(DVec3::new(0.06, 0.0, -0.01))))
        })
    });
}

criterion_group!(benches, benchmark_resolve_step);
criterion_main!(benches);
