//! WGSL sources.
//!
//! The particle and shadow passes are both prefixed with the same
//! state-fetch snippet so their instance-to-texel mapping is one function.

/// Per-texel simulation compute shader (`main`, workgroup 8x8).
pub const SIMULATE_WGSL: &str = include_str!("shaders/simulate.wgsl");

/// Instance index to state texel lookup and the sprite quad corners.
pub const STATE_FETCH_WGSL: &str = include_str!("shaders/state_fetch.wgsl");

/// Additive particle sprites (`vs_main` / `fs_main`).
pub const PARTICLES_WGSL: &str = concat!(
    include_str!("shaders/state_fetch.wgsl"),
    include_str!("shaders/particles.wgsl"),
);

/// Depth-only shadow sprites cut to a disc (`vs_main` / `fs_main`).
pub const SHADOW_WGSL: &str = concat!(
    include_str!("shaders/state_fetch.wgsl"),
    include_str!("shaders/shadow.wgsl"),
);

/// Textured room with the shadow-receiving floor (`vs_main` / `fs_main`).
pub const ROOM_WGSL: &str = include_str!("shaders/room.wgsl");

/// Compute workgroup edge, matching `@workgroup_size(8, 8)`.
pub const WORKGROUP_SIZE: u32 = 8;

/// All shaders by name, for validation tooling.
pub fn all() -> [(&'static str, &'static str); 4] {
    [
        ("simulate", SIMULATE_WGSL),
        ("particles", PARTICLES_WGSL),
        ("shadow", SHADOW_WGSL),
        ("room", ROOM_WGSL),
    ]
}

/// Workgroups needed to cover `extent` texels along one axis.
pub fn workgroups(extent: u32) -> u32 {
    extent.div_ceil(WORKGROUP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_passes_share_fetch() {
        assert!(PARTICLES_WGSL.starts_with(STATE_FETCH_WGSL));
        assert!(SHADOW_WGSL.starts_with(STATE_FETCH_WGSL));
    }

    #[test]
    fn test_shadow_disc_uses_full_quad_coordinate() {
        // disc_radius is measured against a quad half-size of 1.
        assert!(SHADOW_WGSL.contains("out.quad_uv = corner;"));
        assert!(SHADOW_WGSL.contains("length(in.quad_uv) > shadow.disc_radius"));
        assert!(PARTICLES_WGSL.contains("out.quad_uv = corner;"));
    }

    #[test]
    fn test_workgroups_cover_grid() {
        assert_eq!(workgroups(1024), 128);
        assert_eq!(workgroups(1), 1);
        assert_eq!(workgroups(9), 2);
    }
}
