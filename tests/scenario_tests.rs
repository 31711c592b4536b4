//! End-to-end runs of sampler, pointer and update rule on the CPU.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use shapeswarm::kernel::turbulence;
use shapeswarm::{
    Camera, GridSize, Mesh, OriginTexture, PointerAttraction, PointerProjector, ReferenceSwarm,
    SimParams, Triangle, Vec2, Vec3, Vec4, POINTER_SENTINEL,
};

fn unit_triangle_origin(grid: GridSize, seed: u64) -> OriginTexture {
    let mesh = Mesh::from_triangles(vec![Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)]);
    let mut rng = SmallRng::seed_from_u64(seed);
    OriginTexture::from_mesh_with_rng(&mesh, grid, &mut rng)
}

#[test]
fn test_first_frame_on_small_grid() {
    let grid = GridSize::new(4, 4);
    let params = SimParams::default();
    let mut swarm = ReferenceSwarm::new(unit_triangle_origin(grid, 17), params);

    let pointer = PointerProjector::new(0.2).update(Camera::new().view_proj(16.0 / 9.0));
    assert_eq!(pointer.position, POINTER_SENTINEL);

    let stats = swarm.step(params.phase(0.0), &pointer);
    // 3% of 16 texels is about half a texel.
    assert!(stats.respawned <= 1, "respawned {}", stats.respawned);
    assert_eq!(stats.recovered, 0);
    assert!(swarm.current().iter().all(|t| t.is_finite()));
}

#[test]
fn test_pointer_on_particle_pushes_it_away() {
    let radius = 0.5;
    let params = SimParams {
        respawn_threshold: 1.0,
        ..Default::default()
    };
    let particle = Vec3::new(0.25, 0.25, 0.0);
    let origin = OriginTexture::filled(GridSize::new(1, 1), particle);
    let mut swarm = ReferenceSwarm::new(origin, params);

    let phase = 0.5;
    let pointer = PointerAttraction::new(particle, radius);
    swarm.step(phase, &pointer);

    let drifted = turbulence(particle, phase, params.step_size);
    let next = swarm.current()[0].truncate();
    let away = (drifted - pointer.position).normalize_or_zero();
    let push = (next - drifted).dot(away);
    assert!(push > 0.0);
    assert!(push <= radius * params.repel_gain + 1e-6);
    assert!((next - particle).length() <= params.max_displacement(radius) + 1e-6);
}

#[test]
fn test_cursor_repels_swarm_under_it() {
    let grid = GridSize::new(32, 32);
    let params = SimParams {
        respawn_threshold: 1.0,
        ..Default::default()
    };
    let origin = unit_triangle_origin(grid, 23);
    let mut swarm = ReferenceSwarm::new(origin.clone(), params);

    let camera = Camera::from_eye(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
    let mut projector = PointerProjector::new(0.3);
    projector.set_cursor(Vec2::ZERO);
    let pointer = projector.update(camera.view_proj(1.0));
    assert!(pointer.position.length() < 1e-3);

    for frame in 0..20 {
        swarm.step(params.phase(frame as f32 / 60.0), &pointer);
    }

    // Nothing that started outside the radius can end up well inside it.
    let start_near = origin
        .texels()
        .iter()
        .filter(|t| t.truncate().length() < 0.1)
        .count();
    let end_near = swarm
        .current()
        .iter()
        .filter(|t| t.truncate().length() < 0.1)
        .count();
    assert!(start_near > 0);
    assert!(end_near < start_near, "{} -> {}", start_near, end_near);
}

#[test]
fn test_swarm_keeps_silhouette_over_many_frames() {
    let grid = GridSize::new(32, 32);
    let params = SimParams::default();
    let mut swarm = ReferenceSwarm::new(unit_triangle_origin(grid, 29), params);
    let pointer = PointerAttraction::inactive(0.2);

    for frame in 0..600 {
        swarm.step(params.phase(frame as f32 / 60.0), &pointer);
    }

    // Respawns keep pulling particles back, so the cloud stays near the triangle.
    let mean = swarm
        .current()
        .iter()
        .fold(Vec4::ZERO, |acc, t| acc + *t)
        / grid.count() as f32;
    assert!(mean.is_finite());
    assert!(mean.truncate().distance(Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)) < 0.3);
    assert!(swarm.current().iter().all(|t| t.w == 0.0));
}
