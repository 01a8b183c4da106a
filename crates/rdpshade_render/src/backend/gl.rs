use std::rc::Rc;

use glow::HasContext;

use rdpshade_core::DeviceCaps;
use rdpshade_shader::ProgramSource;

use super::{CompileError, ProgramBackend, ShaderStage, UniformValue};

/// Fixed attribute slots shared by every generated vertex shader.
pub const ATTRIBUTE_LOCATIONS: [(u32, &str); 5] = [
    (0, "aPosition"),
    (1, "aColor"),
    (2, "aTexCoord0"),
    (3, "aNumLights"),
    (4, "aModify"),
];

/// `glow` backed compiler. Holds the context by `Rc`, so it stays on the
/// context thread.
pub struct GlBackend {
    gl: Rc<glow::Context>,
}

impl GlBackend {
    #[must_use]
    pub fn new(gl: Rc<glow::Context>) -> Self {
        Self { gl }
    }

    #[must_use]
    pub fn context(&self) -> &Rc<glow::Context> {
        &self.gl
    }

    /// Capabilities derived from the context's extension list.
    #[must_use]
    pub fn caps(&self) -> DeviceCaps {
        DeviceCaps::from_extensions(self.gl.supported_extensions().iter().map(String::as_str))
    }

    fn compile_stage(
        &self,
        kind: u32,
        stage: ShaderStage,
        source: &str,
    ) -> Result<glow::Shader, CompileError> {
        // SAFETY: `self.gl` is current on this thread; the shader object is
        // deleted on every failure path.
        unsafe {
            let shader = self.gl.create_shader(kind).map_err(CompileError::Allocation)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                Err(CompileError::Compile { stage, log })
            }
        }
    }
}

impl ProgramBackend for GlBackend {
    type Program = glow::Program;
    type Location = glow::UniformLocation;

    fn compile(&mut self, source: &ProgramSource) -> Result<glow::Program, CompileError> {
        let vs = self.compile_stage(glow::VERTEX_SHADER, ShaderStage::Vertex, &source.vertex)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, ShaderStage::Fragment, &source.fragment)
        {
            Ok(fs) => fs,
            Err(e) => {
                // SAFETY: `vs` was created above on the current context.
                unsafe { self.gl.delete_shader(vs) };
                return Err(e);
            }
        };

        // SAFETY: all objects belong to the current context and are released
        // before returning.
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(fs);
                    return Err(CompileError::Allocation(e));
                }
            };
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            for (index, name) in ATTRIBUTE_LOCATIONS {
                self.gl.bind_attrib_location(program, index, name);
            }
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);

            if self.gl.get_program_link_status(program) {
                Ok(program)
            } else {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                Err(CompileError::Link { log })
            }
        }
    }

    fn destroy(&mut self, program: glow::Program) {
        // SAFETY: called only while the owning context is current.
        unsafe { self.gl.delete_program(program) };
    }

    fn uniform_location(&mut self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        // SAFETY: read-only query on the current context.
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn use_program(&mut self, program: glow::Program) {
        // SAFETY: `program` is a live program of the current context.
        unsafe { self.gl.use_program(Some(program)) };
    }

    fn set_uniform(&mut self, location: &glow::UniformLocation, value: UniformValue<'_>) {
        let loc = Some(location);
        // SAFETY: `location` was resolved against the program in use.
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, v),
                UniformValue::IVec2([x, y]) => self.gl.uniform_2_i32(loc, x, y),
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Vec2Array(_) => self.gl.uniform_2_f32_slice(loc, &value.to_floats()),
                UniformValue::Vec3Array(_) => self.gl.uniform_3_f32_slice(loc, &value.to_floats()),
            }
        }
    }
}
