//! Parses and validates every shader the renderer builds.

use shapeswarm::shaders;

/// Validates WGSL code using naga.
fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn test_all_shaders_validate() {
    for (name, source) in shaders::all() {
        if let Err(e) = validate_wgsl(source) {
            panic!("{} shader failed:\n{}", name, e);
        }
    }
}

#[test]
fn test_simulate_entry_point() {
    let module = validate_wgsl(shaders::SIMULATE_WGSL).unwrap();
    let eps = entry_points(&module);
    assert_eq!(eps, vec![("main", naga::ShaderStage::Compute)]);
    assert_eq!(
        module.entry_points[0].workgroup_size,
        [shaders::WORKGROUP_SIZE, shaders::WORKGROUP_SIZE, 1]
    );
}

#[test]
fn test_render_shaders_have_both_stages() {
    for source in [shaders::PARTICLES_WGSL, shaders::SHADOW_WGSL, shaders::ROOM_WGSL] {
        let module = validate_wgsl(source).unwrap();
        let eps = entry_points(&module);
        assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }
}

#[test]
fn test_uniform_block_sizes_match_rust() {
    use shapeswarm::uniforms::{ParticleUniforms, RoomUniforms, ShadowUniforms, SimUniforms};

    let cases = [
        (shaders::SIMULATE_WGSL, "SimUniforms", std::mem::size_of::<SimUniforms>()),
        (shaders::PARTICLES_WGSL, "ParticleUniforms", std::mem::size_of::<ParticleUniforms>()),
        (shaders::SHADOW_WGSL, "ShadowUniforms", std::mem::size_of::<ShadowUniforms>()),
        (shaders::ROOM_WGSL, "RoomUniforms", std::mem::size_of::<RoomUniforms>()),
    ];
    for (source, name, rust_size) in cases {
        let module = validate_wgsl(source).unwrap();
        let (_, ty) = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("{} not declared", name));
        match ty.inner {
            naga::TypeInner::Struct { span, .. } => assert_eq!(span as usize, rust_size, "{}", name),
            _ => panic!("{} is not a struct", name),
        }
    }
}
