//! Uniform Binder
//!
//! Pushes per-draw values onto a cached program. Uniform locations are
//! resolved the first time a name is bound and remembered by the program,
//! absences included, so steady-state binds never query the backend.

use glam::{IVec2, Vec2, Vec3, Vec4};

use rdpshade_core::{MAX_LIGHTS, ShaderStateKey};

use crate::backend::{ProgramBackend, UniformValue};
use crate::cache::ProgramCache;
use crate::errors::{Result, ShadeError};
use crate::program::ProgramId;

const LIGHT_SLOTS: usize = MAX_LIGHTS as usize;

/// Every runtime uniform of the key programs for one draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    // ---- Combiner constants ----
    pub fog_color: Vec4,
    pub center_color: Vec4,
    pub scale_color: Vec4,
    pub blend_color: Vec4,
    pub env_color: Vec4,
    pub prim_color: Vec4,
    pub prim_lod: f32,
    pub k4: f32,
    pub k5: f32,

    // ---- Fragment state ----
    pub screen_scale: Vec2,
    pub alpha_test_value: f32,
    /// Blend even when the render mode would not, per cycle.
    pub force_blend: [bool; 2],
    pub min_lod: f32,
    pub max_tile: i32,
    pub texture_size: [Vec2; 2],
    /// Texture unit bound to `uTex0` / `uTex1`.
    pub texture_units: [i32; 2],

    // ---- Lighting ----
    pub light_directions: [Vec3; LIGHT_SLOTS],
    /// Directional colors followed by the ambient color at index `n`.
    pub light_colors: [Vec3; LIGHT_SLOTS + 1],

    // ---- Vertex stage ----
    pub fog_scale: Vec2,
    pub screen_coords_scale: Vec2,
    pub tex_scale: Vec2,
    pub tex_offset: [Vec2; 2],
    pub cache_scale: [Vec2; 2],
    pub cache_offset: [Vec2; 2],
    pub cache_shift_scale: [Vec2; 2],
    /// Tile is sampled from a framebuffer copy (flipped vertically).
    pub cache_frame_buffer: [bool; 2],
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            fog_color: Vec4::ZERO,
            center_color: Vec4::ZERO,
            scale_color: Vec4::ZERO,
            blend_color: Vec4::ZERO,
            env_color: Vec4::ZERO,
            prim_color: Vec4::ZERO,
            prim_lod: 0.0,
            k4: 0.0,
            k5: 0.0,
            screen_scale: Vec2::ONE,
            alpha_test_value: 0.0,
            force_blend: [false; 2],
            min_lod: 0.0,
            max_tile: 0,
            texture_size: [Vec2::ONE; 2],
            texture_units: [0, 1],
            light_directions: [Vec3::ZERO; LIGHT_SLOTS],
            light_colors: [Vec3::ZERO; LIGHT_SLOTS + 1],
            fog_scale: Vec2::ZERO,
            screen_coords_scale: Vec2::ONE,
            tex_scale: Vec2::ONE,
            tex_offset: [Vec2::ZERO; 2],
            cache_scale: [Vec2::ONE; 2],
            cache_offset: [Vec2::ZERO; 2],
            cache_shift_scale: [Vec2::ONE; 2],
            cache_frame_buffer: [false; 2],
        }
    }
}

impl ParameterSnapshot {
    /// Calls `f` for each uniform a program with `light_count` lights may
    /// declare.
    pub fn for_each_uniform(
        &self,
        light_count: usize,
        mut f: impl FnMut(&'static str, UniformValue<'_>),
    ) {
        f("uTex0", UniformValue::Int(self.texture_units[0]));
        f("uTex1", UniformValue::Int(self.texture_units[1]));
        f("uTextureSize", UniformValue::Vec2Array(&self.texture_size));

        f("uFogColor", UniformValue::Vec4(self.fog_color));
        f("uCenterColor", UniformValue::Vec4(self.center_color));
        f("uScaleColor", UniformValue::Vec4(self.scale_color));
        f("uBlendColor", UniformValue::Vec4(self.blend_color));
        f("uEnvColor", UniformValue::Vec4(self.env_color));
        f("uPrimColor", UniformValue::Vec4(self.prim_color));
        f("uPrimLod", UniformValue::Float(self.prim_lod));
        f("uK4", UniformValue::Float(self.k4));
        f("uK5", UniformValue::Float(self.k5));
        f("uScreenScale", UniformValue::Vec2(self.screen_scale));
        f("uAlphaTestValue", UniformValue::Float(self.alpha_test_value));
        f("uForceBlendCycle1", UniformValue::Int(i32::from(self.force_blend[0])));
        f("uForceBlendCycle2", UniformValue::Int(i32::from(self.force_blend[1])));
        f("uMinLod", UniformValue::Float(self.min_lod));
        f("uMaxTile", UniformValue::Int(self.max_tile));

        let n = light_count.min(LIGHT_SLOTS);
        if n > 0 {
            f("uLightDirection", UniformValue::Vec3Array(&self.light_directions[..n]));
            f("uLightColor", UniformValue::Vec3Array(&self.light_colors[..=n]));
        }

        f("uFogScale", UniformValue::Vec2(self.fog_scale));
        f("uScreenCoordsScale", UniformValue::Vec2(self.screen_coords_scale));
        f("uTexScale", UniformValue::Vec2(self.tex_scale));
        f("uTexOffset", UniformValue::Vec2Array(&self.tex_offset));
        f("uCacheScale", UniformValue::Vec2Array(&self.cache_scale));
        f("uCacheOffset", UniformValue::Vec2Array(&self.cache_offset));
        f("uCacheShiftScale", UniformValue::Vec2Array(&self.cache_shift_scale));
        let fb = IVec2::new(
            i32::from(self.cache_frame_buffer[0]),
            i32::from(self.cache_frame_buffer[1]),
        );
        f("uCacheFrameBuffer", UniformValue::IVec2(fb.to_array()));
    }
}

/// Runtime uniforms of the utility programs.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityParameters {
    /// Texrect bounds in texels: `(s0, t0, s1, t1)`.
    pub texture_bounds: Vec4,
    pub texture_size: Vec2,
    pub enable_alpha_test: bool,
    pub screen_size: Vec2,
    pub texture_unit: i32,
}

impl Default for UtilityParameters {
    fn default() -> Self {
        Self {
            texture_bounds: Vec4::ZERO,
            texture_size: Vec2::ONE,
            enable_alpha_test: false,
            screen_size: Vec2::ONE,
            texture_unit: 0,
        }
    }
}

impl UtilityParameters {
    pub fn for_each_uniform(&self, mut f: impl FnMut(&'static str, UniformValue<'_>)) {
        f("uTex0", UniformValue::Int(self.texture_unit));
        f("uColorImage", UniformValue::Int(self.texture_unit));
        f("uTextureBounds", UniformValue::Vec4(self.texture_bounds));
        f("uTextureSize", UniformValue::Vec2(self.texture_size));
        f("uEnableAlphaTest", UniformValue::Int(i32::from(self.enable_alpha_test)));
        f("uScreenSize", UniformValue::Vec2(self.screen_size));
    }
}

impl<B: ProgramBackend> ProgramCache<B> {
    /// Makes `id` current and sets every uniform it declares from `params`.
    pub fn bind(&mut self, id: ProgramId, params: &ParameterSnapshot) -> Result<()> {
        if !self.is_live() {
            return Err(ShadeError::ContextLost);
        }
        let (backend, entries) = self.parts_mut();
        let entry = entries.get_mut(id).ok_or(ShadeError::StaleProgram)?;
        let light_count = entry.owner.key().map_or(0, ShaderStateKey::light_count);

        let program = &mut entry.program;
        backend.use_program(program.handle);
        params.for_each_uniform(usize::from(light_count), |name, value| {
            if let Some(location) = program.location(backend, name) {
                backend.set_uniform(&location, value);
            }
        });
        Ok(())
    }

    /// Makes a utility program current and sets its uniforms.
    pub fn bind_utility(&mut self, id: ProgramId, params: &UtilityParameters) -> Result<()> {
        if !self.is_live() {
            return Err(ShadeError::ContextLost);
        }
        let (backend, entries) = self.parts_mut();
        let program = &mut entries.get_mut(id).ok_or(ShadeError::StaleProgram)?.program;
        backend.use_program(program.handle);
        params.for_each_uniform(|name, value| {
            if let Some(location) = program.location(backend, name) {
                backend.set_uniform(&location, value);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use rdpshade_core::KeyDesc;
    use rdpshade_shader::UtilityProgram;

    fn lit_key(light_count: u8) -> ShaderStateKey {
        ShaderStateKey::new(KeyDesc {
            light_count,
            ..KeyDesc::default()
        })
        .unwrap()
    }

    #[test]
    fn test_light_arrays_are_sliced() {
        let mut names = Vec::new();
        ParameterSnapshot::default().for_each_uniform(2, |name, value| {
            if name.starts_with("uLight") {
                names.push((name, value.to_floats().len()));
            }
        });
        assert_eq!(names, [("uLightDirection", 6), ("uLightColor", 9)]);
    }

    #[test]
    fn test_no_light_uniforms_without_lights() {
        let mut seen = false;
        ParameterSnapshot::default().for_each_uniform(0, |name, _| seen |= name.starts_with("uLight"));
        assert!(!seen);
    }

    #[test]
    fn test_bind_sets_declared_uniforms() {
        let mut cache = ProgramCache::new(HeadlessBackend::new(), 4);
        let id = cache.acquire(&lit_key(1)).unwrap();
        let params = ParameterSnapshot {
            prim_color: Vec4::new(1.0, 0.5, 0.25, 1.0),
            force_blend: [true, false],
            ..ParameterSnapshot::default()
        };
        cache.bind(id, &params).unwrap();

        let handle = cache.program(id).unwrap().handle();
        let backend = cache.backend();
        assert_eq!(backend.bound_program(), Some(handle));
        assert_eq!(backend.uniform_value(handle, "uPrimColor"), Some(&[1.0, 0.5, 0.25, 1.0][..]));
        assert_eq!(backend.uniform_value(handle, "uForceBlendCycle1"), Some(&[1.0][..]));
        assert_eq!(backend.uniform_value(handle, "uLightColor").map(<[f32]>::len), Some(6));
    }

    #[test]
    fn test_bind_utility() {
        let mut cache = ProgramCache::new(HeadlessBackend::new(), 4);
        let id = cache.acquire_utility(UtilityProgram::Monochrome).unwrap();
        let params = UtilityParameters {
            screen_size: Vec2::new(640.0, 480.0),
            ..UtilityParameters::default()
        };
        cache.bind_utility(id, &params).unwrap();
        let handle = cache.program(id).unwrap().handle();
        assert_eq!(cache.backend().uniform_value(handle, "uScreenSize"), Some(&[640.0, 480.0][..]));
    }

    #[test]
    fn test_stale_id() {
        let mut cache = ProgramCache::new(HeadlessBackend::new(), 4);
        let id = cache.acquire(&lit_key(0)).unwrap();
        cache.invalidate_all();
        assert_eq!(cache.bind(id, &ParameterSnapshot::default()), Err(ShadeError::StaleProgram));
    }
}
