//! Properties of the CPU update rule.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use shapeswarm::kernel::{repel, step_texel, texel_hash, TexelUpdate};
use shapeswarm::{
    GridSize, Mesh, OriginTexture, PointerAttraction, ReferenceSwarm, SimParams, Triangle, Vec3,
    Vec4,
};

fn origin(grid: GridSize, seed: u64) -> OriginTexture {
    let mesh = Mesh::from_triangles(vec![
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
        Triangle::new(Vec3::X, Vec3::X + Vec3::Y, Vec3::Y),
    ]);
    let mut rng = SmallRng::seed_from_u64(seed);
    OriginTexture::from_mesh_with_rng(&mesh, grid, &mut rng)
}

#[test]
fn test_identical_inputs_give_identical_steps() {
    let grid = GridSize::new(32, 32);
    let mut a = ReferenceSwarm::new(origin(grid, 1), SimParams::default());
    let mut b = ReferenceSwarm::new(origin(grid, 1), SimParams::default());
    let pointer = PointerAttraction::new(Vec3::new(0.5, 0.5, 0.0), 0.2);
    for frame in 0..10 {
        let phase = 0.5 + frame as f32 * 0.004;
        assert_eq!(a.step(phase, &pointer), b.step(phase, &pointer));
    }
    assert_eq!(a.current(), b.current());
}

#[test]
fn test_respawn_rate_near_three_percent() {
    let grid = GridSize::new(64, 64);
    let params = SimParams::default();
    let mut swarm = ReferenceSwarm::new(origin(grid, 2), params);
    let pointer = PointerAttraction::inactive(0.2);
    let frames = 50;
    let mut respawned = 0;
    for frame in 0..frames {
        let stats = swarm.step(params.phase(frame as f32 / 60.0), &pointer);
        assert_eq!(stats.recovered, 0);
        respawned += stats.respawned;
    }
    let rate = respawned as f32 / (grid.count() * frames) as f32;
    assert!((0.028..0.032).contains(&rate), "rate {}", rate);
}

#[test]
fn test_respawned_texels_equal_origin() {
    let grid = GridSize::new(64, 64);
    let params = SimParams::default();
    let start = origin(grid, 3);
    let mut swarm = ReferenceSwarm::new(start.clone(), params);
    // Move everything off the origin first.
    swarm.set_current(start.texels().iter().map(|t| *t + Vec4::new(1.0, 1.0, 1.0, 0.0)).collect());

    let phase = 0.75;
    swarm.step(phase, &PointerAttraction::inactive(0.2));
    for (index, (now, orig)) in swarm.current().iter().zip(start.texels()).enumerate() {
        let (x, y) = grid.texel(index as u32);
        if texel_hash(x, y, phase) > params.respawn_threshold {
            assert_eq!(now, orig);
        } else {
            assert_ne!(now, orig);
        }
    }
}

#[test]
fn test_moved_texels_stay_within_step_bound() {
    let grid = GridSize::new(32, 32);
    let params = SimParams::default();
    let radius = 0.3;
    let start = origin(grid, 4);
    let mut swarm = ReferenceSwarm::new(start.clone(), params);
    let pointer = PointerAttraction::new(Vec3::new(0.5, 0.5, 0.0), radius);

    swarm.step(0.5, &pointer);
    let bound = params.max_displacement(radius) + 1e-5;
    for (index, (now, before)) in swarm.current().iter().zip(start.texels()).enumerate() {
        let (x, y) = grid.texel(index as u32);
        if texel_hash(x, y, 0.5) <= params.respawn_threshold {
            assert!((*now - *before).truncate().length() <= bound);
        }
    }
}

#[test]
fn test_reserved_channel_is_carried() {
    let params = SimParams {
        respawn_threshold: 1.0,
        ..Default::default()
    };
    let update = step_texel(
        Vec4::new(0.1, 0.2, 0.3, 0.0),
        Vec4::ZERO,
        (1, 2),
        0.5,
        &PointerAttraction::inactive(0.2),
        &params,
    );
    assert!(matches!(update, TexelUpdate::Moved(_)));
    assert_eq!(update.value().w, 0.0);
}

#[test]
fn test_repel_only_inside_radius() {
    let pointer = PointerAttraction::new(Vec3::ZERO, 0.5);
    let outside = Vec3::new(0.6, 0.0, 0.0);
    assert_eq!(repel(outside, &pointer, 0.1), outside);

    let inside = Vec3::new(0.2, 0.0, 0.0);
    let pushed = repel(inside, &pointer, 0.1);
    assert!((pushed - Vec3::new(0.25, 0.0, 0.0)).length() < 1e-6);
}

#[test]
fn test_ping_pong_never_exposes_written_buffer() {
    let grid = GridSize::new(8, 8);
    let start = origin(grid, 5);
    let mut swarm = ReferenceSwarm::new(start.clone(), SimParams::default());
    assert_eq!(swarm.ping_pong().current_index(), 0);

    swarm.step(0.5, &PointerAttraction::inactive(0.2));
    assert_eq!(swarm.ping_pong().current_index(), 1);
    // The buffer read this frame still holds the seed.
    assert_eq!(swarm.ping_pong().buffers()[0].as_slice(), start.texels());

    swarm.step(0.51, &PointerAttraction::inactive(0.2));
    assert_eq!(swarm.ping_pong().current_index(), 0);
}

#[test]
fn test_nan_state_heals_in_one_step() {
    let grid = GridSize::new(4, 4);
    let start = origin(grid, 6);
    let mut swarm = ReferenceSwarm::new(start.clone(), SimParams::default());
    swarm.set_current(vec![Vec4::splat(f32::NAN); 16]);

    let stats = swarm.step(0.5, &PointerAttraction::inactive(0.2));
    assert_eq!(stats.respawned + stats.recovered, 16);
    assert_eq!(swarm.current(), start.texels());
}
