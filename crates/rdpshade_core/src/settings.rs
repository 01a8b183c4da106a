//! Shader Cache Settings & Device Capabilities
//!
//! Runtime toggles that used to be build-time switches of the shader
//! library. Every toggle that changes generated source is folded into the
//! [`ShaderStateKey`](crate::ShaderStateKey) by the builder, so a single
//! build serves every variant.
//!
//! # Sources
//!
//! Settings can be constructed directly, deserialized from JSON, or read
//! from libretro-style core option pairs:
//!
//! ```rust,ignore
//! let settings = ShaderCacheSettings::from_core_options([
//!     ("rdpshade-cache-capacity", "128"),
//!     ("rdpshade-texture-filter", "3point"),
//!     ("rdpshade-toonify", "on"),
//! ]);
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Global configuration for shader generation and the program cache.
///
/// | Field                 | Description                                   | Default |
/// |-----------------------|-----------------------------------------------|---------|
/// | `capacity`            | Maximum live programs per context             | 256     |
/// | `hardware_lighting`   | Per-pixel light evaluation in the fragment stage | `true` |
/// | `enable_lod`          | Full LOD/mipmap emulation                     | `true`  |
/// | `enable_noise`        | Pseudo-random noise input                     | `true`  |
/// | `three_point_filter`  | N64 3-point filtering instead of bilinear     | `false` |
/// | `toonify`             | Toon-shading post-process                     | `false` |
/// | `dump_shaders`        | Trace-log every generated source              | `false` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderCacheSettings {
    pub capacity: usize,
    pub hardware_lighting: bool,
    pub enable_lod: bool,
    pub enable_noise: bool,
    pub three_point_filter: bool,
    pub toonify: bool,
    pub dump_shaders: bool,
}

impl Default for ShaderCacheSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            hardware_lighting: true,
            enable_lod: true,
            enable_noise: true,
            three_point_filter: false,
            toonify: false,
            dump_shaders: false,
        }
    }
}

impl ShaderCacheSettings {
    /// Parses settings from a JSON document. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies libretro-style core option pairs on top of the defaults.
    ///
    /// Unknown keys and unparsable values are logged and ignored.
    pub fn from_core_options<'a, I>(options: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut settings = Self::default();
        for (key, value) in options {
            settings.apply_core_option(key, value);
        }
        settings
    }

    /// Applies a single core option. Returns `false` when the pair was
    /// ignored.
    pub fn apply_core_option(&mut self, key: &str, value: &str) -> bool {
        let applied = match key {
            "rdpshade-cache-capacity" => match value.parse::<usize>() {
                Ok(capacity) if capacity > 0 => {
                    self.capacity = capacity;
                    true
                }
                _ => false,
            },
            "rdpshade-texture-filter" => match value {
                "standard" => {
                    self.three_point_filter = false;
                    true
                }
                "3point" => {
                    self.three_point_filter = true;
                    true
                }
                _ => false,
            },
            "rdpshade-hw-lighting" => set_switch(&mut self.hardware_lighting, value),
            "rdpshade-lod" => set_switch(&mut self.enable_lod, value),
            "rdpshade-noise" => set_switch(&mut self.enable_noise, value),
            "rdpshade-toonify" => set_switch(&mut self.toonify, value),
            "rdpshade-dump-shaders" => set_switch(&mut self.dump_shaders, value),
            _ => {
                log::debug!("Ignoring unknown core option '{key}'");
                return false;
            }
        };

        if !applied {
            log::warn!("Invalid value '{value}' for core option '{key}'");
        }
        applied
    }
}

fn set_switch(target: &mut bool, value: &str) -> bool {
    match value {
        "on" | "enabled" | "true" => {
            *target = true;
            true
        }
        "off" | "disabled" | "false" => {
            *target = false;
            true
        }
        _ => false,
    }
}

/// Capabilities of the active graphics context that affect generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceCaps {
    /// `GL_OES_standard_derivatives` (or core `dFdx`/`dFdy`).
    pub standard_derivatives: bool,
    /// `GL_EXT_shader_texture_lod` (explicit-LOD sampling in fragment shaders).
    pub shader_texture_lod: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            standard_derivatives: true,
            shader_texture_lod: true,
        }
    }
}

impl DeviceCaps {
    /// A context that can run the full LOD-chain mipmap helper.
    #[must_use]
    pub fn supports_lod_chain(&self) -> bool {
        self.standard_derivatives && self.shader_texture_lod
    }

    /// Derives capabilities from a GL extension list.
    pub fn from_extensions<'a, I>(extensions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut caps = Self {
            standard_derivatives: false,
            shader_texture_lod: false,
        };
        for ext in extensions {
            match ext {
                "GL_OES_standard_derivatives" => caps.standard_derivatives = true,
                "GL_EXT_shader_texture_lod" => caps.shader_texture_lod = true,
                _ => {}
            }
        }
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_options_override_defaults() {
        let settings = ShaderCacheSettings::from_core_options([
            ("rdpshade-cache-capacity", "32"),
            ("rdpshade-texture-filter", "3point"),
            ("rdpshade-noise", "off"),
            ("rdpshade-toonify", "enabled"),
        ]);
        assert_eq!(settings.capacity, 32);
        assert!(settings.three_point_filter);
        assert!(!settings.enable_noise);
        assert!(settings.toonify);
        assert!(settings.enable_lod);
    }

    #[test]
    fn test_invalid_core_option_is_ignored() {
        let mut settings = ShaderCacheSettings::default();
        assert!(!settings.apply_core_option("rdpshade-cache-capacity", "0"));
        assert!(!settings.apply_core_option("rdpshade-lod", "maybe"));
        assert!(!settings.apply_core_option("mupen64-cpucore", "pure_interpreter"));
        assert_eq!(settings, ShaderCacheSettings::default());
    }

    #[test]
    fn test_json_missing_fields_use_defaults() {
        let settings = ShaderCacheSettings::from_json(r#"{ "capacity": 8 }"#).unwrap();
        assert_eq!(settings.capacity, 8);
        assert!(settings.hardware_lighting);
    }

    #[test]
    fn test_caps_from_extensions() {
        let caps = DeviceCaps::from_extensions(["GL_OES_standard_derivatives"]);
        assert!(caps.standard_derivatives);
        assert!(!caps.supports_lod_chain());
    }
}
