//! Cached program records.

use rustc_hash::FxHashMap;
use slotmap::new_key_type;

use rdpshade_core::ShaderStateKey;
use rdpshade_shader::UtilityProgram;

use crate::backend::ProgramBackend;

new_key_type! {
    /// Handle to a program owned by a [`ProgramCache`](crate::ProgramCache).
    ///
    /// Stays valid until the program is evicted or the cache is
    /// invalidated; afterwards lookups report
    /// [`ShadeError::StaleProgram`](crate::ShadeError::StaleProgram).
    pub struct ProgramId;
}

/// What a cached program was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryOwner {
    Key(ShaderStateKey),
    Utility(UtilityProgram),
}

impl EntryOwner {
    #[must_use]
    pub fn key(&self) -> Option<&ShaderStateKey> {
        match self {
            Self::Key(key) => Some(key),
            Self::Utility(_) => None,
        }
    }
}

/// A linked program plus its lazily resolved uniform locations.
pub struct CompiledProgram<B: ProgramBackend> {
    pub(crate) handle: B::Program,
    /// `None` entries remember uniforms the program does not declare.
    pub(crate) locations: FxHashMap<&'static str, Option<B::Location>>,
    pub(crate) source_hash: u128,
}

impl<B: ProgramBackend> CompiledProgram<B> {
    pub(crate) fn new(handle: B::Program, source_hash: u128) -> Self {
        Self {
            handle,
            locations: FxHashMap::default(),
            source_hash,
        }
    }

    #[must_use]
    pub fn handle(&self) -> B::Program {
        self.handle
    }

    /// xxh3-128 of the source the program was built from.
    #[must_use]
    pub fn source_hash(&self) -> u128 {
        self.source_hash
    }

    /// Uniform names resolved so far, including absent ones.
    #[must_use]
    pub fn resolved_uniforms(&self) -> usize {
        self.locations.len()
    }

    /// Looks up `name` once and caches the answer.
    pub(crate) fn location(&mut self, backend: &mut B, name: &'static str) -> Option<B::Location> {
        let handle = self.handle;
        self.locations
            .entry(name)
            .or_insert_with(|| backend.uniform_location(handle, name))
            .clone()
    }
}

pub(crate) struct CacheEntry<B: ProgramBackend> {
    pub owner: EntryOwner,
    pub program: CompiledProgram<B>,
    pub last_used: u64,
}
