//! The per-texel simulation rule.
//!
//! Every frame each particle texel is rewritten from its own previous value
//! and its own origin sample, never from a neighbor:
//!
//! 1. a hash of `(texel, phase)` decides whether the particle respawns on
//!    its origin sample (`hash > respawn_threshold`, ~3% per frame);
//! 2. otherwise the position drifts through a bounded sine/cosine field;
//! 3. then, inside the pointer's radius, it is pushed away from the pointer;
//! 4. a non-finite result is replaced by the origin sample.
//!
//! The GPU runs `shaders/simulate.wgsl`. The functions here are the same
//! rule on the CPU; they back the tests and the benchmarks, and the hash
//! is integer-only so both sides pick identical respawn texels.

use glam::{Vec3, Vec4};

use crate::pointer::PointerAttraction;
use crate::sampler::OriginTexture;
use crate::state::{GridSize, PingPong};

/// Tunable constants of the update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Scale of the drift field per step.
    pub step_size: f32,
    /// Hash values above this respawn the texel.
    pub respawn_threshold: f32,
    /// Push distance per unit of pointer radius.
    pub repel_gain: f32,
    /// Elapsed seconds are multiplied by this to get the phase.
    pub time_scale: f32,
    /// Added to the scaled elapsed time.
    pub time_offset: f32,
}

impl SimParams {
    /// Phase fed to the kernel for a given elapsed time.
    #[inline]
    pub fn phase(&self, elapsed: f32) -> f32 {
        elapsed * self.time_scale + self.time_offset
    }

    /// Largest distance one step can move a particle that does not respawn.
    pub fn max_displacement(&self, pointer_radius: f32) -> f32 {
        self.step_size * 3f32.sqrt() + pointer_radius * self.repel_gain
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            step_size: 0.005,
            respawn_threshold: 0.97,
            repel_gain: 0.1,
            time_scale: 0.25,
            time_offset: 0.5,
        }
    }
}

#[inline]
fn pcg_hash(v: u32) -> u32 {
    let state = v.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Deterministic value in `[0, 1)` for a texel at a given phase.
#[inline]
pub fn texel_hash(x: u32, y: u32, phase: f32) -> f32 {
    let h = pcg_hash(x ^ pcg_hash(y ^ pcg_hash(phase.to_bits())));
    (h >> 8) as f32 * (1.0 / 16_777_216.0)
}

/// Bounded drift. Each axis pairs two other coordinates at its own
/// frequencies, all read from the incoming position.
#[inline]
pub fn turbulence(p: Vec3, phase: f32, step_size: f32) -> Vec3 {
    let xs = p.x + phase;
    let x = p.x + (p.y * 3.0).sin() * (p.z * 11.0).cos() * step_size;
    let y = p.y + (xs * 5.0).sin() * (p.z * 13.0).cos() * step_size;
    let z = p.z + (xs * 7.0).sin() * (p.y * 17.0).cos() * step_size;
    Vec3::new(x, y, z)
}

/// Push `p` away from the pointer when it is inside the pointer radius.
#[inline]
pub fn repel(p: Vec3, pointer: &PointerAttraction, gain: f32) -> Vec3 {
    let away = p - pointer.position;
    let dist = away.length();
    if pointer.radius - dist <= 0.0 {
        return p;
    }
    let dir = if dist > 1e-6 { away / dist } else { Vec3::Z };
    p + dir * pointer.radius * gain
}

/// Outcome of one texel update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexelUpdate {
    /// Moved by the drift field and pointer.
    Moved(Vec4),
    /// Hash selected a respawn onto the origin sample.
    Respawned(Vec4),
    /// The update was non-finite and was reset to the origin sample.
    Recovered(Vec4),
}

impl TexelUpdate {
    pub fn value(self) -> Vec4 {
        match self {
            TexelUpdate::Moved(v) | TexelUpdate::Respawned(v) | TexelUpdate::Recovered(v) => v,
        }
    }
}

/// Update one texel. Pure: identical inputs give identical output.
pub fn step_texel(
    previous: Vec4,
    origin: Vec4,
    texel: (u32, u32),
    phase: f32,
    pointer: &PointerAttraction,
    params: &SimParams,
) -> TexelUpdate {
    if texel_hash(texel.0, texel.1, phase) > params.respawn_threshold {
        return TexelUpdate::Respawned(origin);
    }
    let drifted = turbulence(previous.truncate(), phase, params.step_size);
    let pushed = repel(drifted, pointer, params.repel_gain);
    let next = pushed.extend(previous.w);
    if previous.is_finite() && next.is_finite() {
        TexelUpdate::Moved(next)
    } else {
        TexelUpdate::Recovered(origin)
    }
}

/// Per-step counters from [`step_grid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub respawned: usize,
    pub recovered: usize,
}

/// Update every texel of `previous` into `next`.
pub fn step_grid(
    previous: &[Vec4],
    origin: &OriginTexture,
    next: &mut [Vec4],
    phase: f32,
    pointer: &PointerAttraction,
    params: &SimParams,
) -> StepStats {
    let grid = origin.grid();
    let mut stats = StepStats::default();
    for (index, ((prev, orig), out)) in previous
        .iter()
        .zip(origin.texels())
        .zip(next.iter_mut())
        .enumerate()
    {
        let update = step_texel(*prev, *orig, grid.texel(index as u32), phase, pointer, params);
        match update {
            TexelUpdate::Respawned(_) => stats.respawned += 1,
            TexelUpdate::Recovered(_) => stats.recovered += 1,
            TexelUpdate::Moved(_) => {}
        }
        *out = update.value();
    }
    stats
}

/// CPU copy of the swarm state, stepped with the same rule as the GPU.
///
/// Used to check the rule end to end and to benchmark it; rendering
/// always reads the GPU textures.
pub struct ReferenceSwarm {
    origin: OriginTexture,
    state: PingPong<Vec<Vec4>>,
    params: SimParams,
}

impl ReferenceSwarm {
    /// Seed both buffers from the origin texture.
    pub fn new(origin: OriginTexture, params: SimParams) -> Self {
        let seed = origin.texels().to_vec();
        let state = PingPong::new(seed.clone(), seed);
        Self {
            origin,
            state,
            params,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.origin.grid()
    }

    pub fn origin(&self) -> &OriginTexture {
        &self.origin
    }

    pub fn current(&self) -> &[Vec4] {
        self.state.current()
    }

    pub fn ping_pong(&self) -> &PingPong<Vec<Vec4>> {
        &self.state
    }

    /// Overwrite the current buffer, e.g. to inject a bad texel.
    pub fn set_current(&mut self, texels: Vec<Vec4>) {
        let origin = &self.origin;
        self.state.step(|_, write| {
            *write = texels;
            write.resize(origin.texels().len(), Vec4::ZERO);
        });
    }

    /// Advance one frame.
    pub fn step(&mut self, phase: f32, pointer: &PointerAttraction) -> StepStats {
        let origin = &self.origin;
        let params = &self.params;
        self.state
            .step(|read, write| step_grid(read, origin, write, phase, pointer, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_range_and_determinism() {
        for x in 0..32 {
            for y in 0..32 {
                let a = texel_hash(x, y, 0.5);
                assert!((0.0..1.0).contains(&a));
                assert_eq!(a, texel_hash(x, y, 0.5));
            }
        }
    }

    #[test]
    fn test_hash_changes_with_phase() {
        let differing = (0..64)
            .filter(|&i| texel_hash(i, 0, 0.5) != texel_hash(i, 0, 0.75))
            .count();
        assert!(differing > 60);
    }

    #[test]
    fn test_turbulence_is_bounded() {
        let step = 0.005;
        for i in 0..100 {
            let f = i as f32 * 0.37;
            let p = Vec3::new(f.sin() * 3.0, f.cos() * 2.0, f * 0.1);
            let d = turbulence(p, f, step) - p;
            // Allow for rounding in the subtraction.
            let bound = step + 1e-5;
            assert!(d.x.abs() <= bound && d.y.abs() <= bound && d.z.abs() <= bound);
        }
    }

    #[test]
    fn test_turbulence_reads_incoming_position() {
        let p = Vec3::new(0.3, 0.2, 0.1);
        let (phase, s) = (0.5, 0.005);
        let (x, y, z) = (p.x + phase, p.y, p.z);
        let expected = Vec3::new(
            p.x + (y * 3.0).sin() * (z * 11.0).cos() * s,
            p.y + (x * 5.0).sin() * (z * 13.0).cos() * s,
            p.z + (x * 7.0).sin() * (y * 17.0).cos() * s,
        );
        assert_eq!(turbulence(p, phase, s), expected);
        assert!((expected.z - 0.103_051_54).abs() < 1e-7);
    }

    #[test]
    fn test_turbulence_not_axis_aligned() {
        let p = Vec3::new(0.3, 0.2, 0.1);
        let d = turbulence(p, 0.5, 0.005) - p;
        assert!(d.x != 0.0 && d.y != 0.0 && d.z != 0.0);
    }

    #[test]
    fn test_repel_coincident_pointer_pushes_along_z() {
        let pointer = PointerAttraction::new(Vec3::ONE, 0.5);
        let pushed = repel(Vec3::ONE, &pointer, 0.1);
        assert!((pushed - Vec3::new(1.0, 1.0, 1.05)).length() < 1e-6);
    }

    #[test]
    fn test_nan_previous_recovers_origin() {
        let origin = Vec4::new(1.0, 2.0, 3.0, 0.0);
        let params = SimParams {
            respawn_threshold: 1.0,
            ..Default::default()
        };
        let update = step_texel(
            Vec4::new(f32::NAN, 0.0, 0.0, 0.0),
            origin,
            (0, 0),
            0.5,
            &PointerAttraction::inactive(0.2),
            &params,
        );
        assert_eq!(update, TexelUpdate::Recovered(origin));
    }

    #[test]
    fn test_infinite_previous_recovers_origin() {
        let origin = Vec4::new(1.0, 2.0, 3.0, 0.0);
        let params = SimParams {
            respawn_threshold: 1.0,
            ..Default::default()
        };
        let update = step_texel(
            Vec4::new(0.0, f32::INFINITY, 0.0, 0.0),
            origin,
            (3, 4),
            0.5,
            &PointerAttraction::inactive(0.2),
            &params,
        );
        assert_eq!(update.value(), origin);
    }

    #[test]
    fn test_phase_mapping() {
        let params = SimParams::default();
        assert_eq!(params.phase(0.0), 0.5);
        assert_eq!(params.phase(4.0), 1.5);
    }
}
