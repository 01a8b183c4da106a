use rustc_hash::{FxHashMap, FxHashSet};

use rdpshade_shader::ProgramSource;

use super::{CompileError, ProgramBackend, ShaderStage, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessProgram(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessLocation {
    pub program: HeadlessProgram,
    pub index: usize,
}

struct LinkedProgram {
    uniforms: Vec<String>,
    values: FxHashMap<usize, Vec<f32>>,
}

type FailurePredicate = Box<dyn Fn(&ProgramSource) -> bool>;

/// Backend that "links" by scanning the sources for uniform declarations.
///
/// Records every call so tests can assert on compile counts, destroyed
/// handles and the values last written to each uniform.
#[derive(Default)]
pub struct HeadlessBackend {
    next_handle: u32,
    programs: FxHashMap<HeadlessProgram, LinkedProgram>,
    destroyed: FxHashSet<HeadlessProgram>,
    bound: Option<HeadlessProgram>,
    fail_if: Option<FailurePredicate>,
    compile_count: usize,
    destroy_count: usize,
    location_queries: usize,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`compile`](ProgramBackend::compile) fail for every source
    /// matching `predicate`.
    pub fn fail_if(&mut self, predicate: impl Fn(&ProgramSource) -> bool + 'static) {
        self.fail_if = Some(Box::new(predicate));
    }

    pub fn clear_failures(&mut self) {
        self.fail_if = None;
    }

    /// Successful and failed compile attempts.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.compile_count
    }

    #[must_use]
    pub fn destroy_count(&self) -> usize {
        self.destroy_count
    }

    #[must_use]
    pub fn location_queries(&self) -> usize {
        self.location_queries
    }

    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_live(&self, program: HeadlessProgram) -> bool {
        self.programs.contains_key(&program)
    }

    #[must_use]
    pub fn was_destroyed(&self, program: HeadlessProgram) -> bool {
        self.destroyed.contains(&program)
    }

    #[must_use]
    pub fn bound_program(&self) -> Option<HeadlessProgram> {
        self.bound
    }

    /// Uniform names declared by `program`, in source order.
    #[must_use]
    pub fn uniform_names(&self, program: HeadlessProgram) -> Vec<&str> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Last value written to `name`, flattened to floats.
    #[must_use]
    pub fn uniform_value(&self, program: HeadlessProgram, name: &str) -> Option<&[f32]> {
        let linked = self.programs.get(&program)?;
        let index = linked.uniforms.iter().position(|u| u == name)?;
        linked.values.get(&index).map(Vec::as_slice)
    }
}

/// Names of the `uniform` declarations in `source`, array suffixes removed.
fn declared_uniforms<'a>(source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    source.lines().filter_map(|line| {
        let decl = line.trim().strip_prefix("uniform ")?.strip_suffix(';')?;
        let name = decl.split_whitespace().last()?;
        Some(name.split('[').next().unwrap_or(name))
    })
}

impl ProgramBackend for HeadlessBackend {
    type Program = HeadlessProgram;
    type Location = HeadlessLocation;

    fn compile(&mut self, source: &ProgramSource) -> Result<HeadlessProgram, CompileError> {
        self.compile_count += 1;
        if self.fail_if.as_ref().is_some_and(|f| f(source)) {
            return Err(CompileError::Compile {
                stage: ShaderStage::Fragment,
                log: "injected failure".to_string(),
            });
        }
        if !source.vertex.contains("void main()") {
            return Err(CompileError::Compile {
                stage: ShaderStage::Vertex,
                log: "missing entry point".to_string(),
            });
        }
        if !source.fragment.contains("void main()") {
            return Err(CompileError::Compile {
                stage: ShaderStage::Fragment,
                log: "missing entry point".to_string(),
            });
        }

        let mut uniforms: Vec<String> = Vec::new();
        for name in declared_uniforms(&source.vertex).chain(declared_uniforms(&source.fragment)) {
            if !uniforms.iter().any(|u| u == name) {
                uniforms.push(name.to_string());
            }
        }

        self.next_handle += 1;
        let handle = HeadlessProgram(self.next_handle);
        self.programs.insert(
            handle,
            LinkedProgram {
                uniforms,
                values: FxHashMap::default(),
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, program: HeadlessProgram) {
        self.destroy_count += 1;
        if self.programs.remove(&program).is_some() {
            self.destroyed.insert(program);
        }
        if self.bound == Some(program) {
            self.bound = None;
        }
    }

    fn uniform_location(&mut self, program: HeadlessProgram, name: &str) -> Option<HeadlessLocation> {
        self.location_queries += 1;
        let index = self.programs.get(&program)?.uniforms.iter().position(|u| u == name)?;
        Some(HeadlessLocation { program, index })
    }

    fn use_program(&mut self, program: HeadlessProgram) {
        self.bound = Some(program);
    }

    fn set_uniform(&mut self, location: &HeadlessLocation, value: UniformValue<'_>) {
        debug_assert_eq!(self.bound, Some(location.program), "uniform set on unbound program");
        if let Some(linked) = self.programs.get_mut(&location.program) {
            linked.values.insert(location.index, value.to_floats());
        }
    }
}
