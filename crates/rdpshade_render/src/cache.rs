//! Program Cache
//!
//! Owns every linked program of one graphics context and maps canonical
//! [`ShaderStateKey`]s to them. Programs are stored in a [`SlotMap`] and
//! addressed through [`ProgramId`] handles.
//!
//! # Lookup
//!
//! [`ProgramCache::acquire`] either returns the cached program for a key or
//! assembles, compiles and stores a new one. Each call advances a
//! generation counter; the entry's `last_used` is set to it on every hit.
//!
//! # Eviction
//!
//! When inserting would exceed `capacity`, the key entry with the smallest
//! `last_used` is destroyed. Utility programs are not counted and never
//! evicted.
//!
//! # Failures
//!
//! A key whose program fails to assemble or link is remembered until the
//! next invalidation, so the same configuration is not recompiled on every
//! draw. While the failure stands, the last program that linked for the
//! same [`RenderClass`] is served in its place, if it is still cached.
//!
//! # Context Lifecycle
//!
//! ```text
//!   Live ──on_context_destroy()──▶ Lost ──on_context_reset(backend)──▶ Live
//! ```
//!
//! While lost, `acquire` returns [`ShadeError::ContextLost`]. A reset starts
//! from an empty cache.

use log::{debug, error, trace, warn};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use rdpshade_core::{RenderClass, ShaderCacheSettings, ShaderStateKey};
use rdpshade_shader::{ProgramSource, UtilityProgram, assemble_program, assemble_utility};

use crate::backend::ProgramBackend;
use crate::errors::{Result, ShadeError};
use crate::program::{CacheEntry, CompiledProgram, EntryOwner, ProgramId};

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Assembly or compile failures, one per failed key.
    pub failures: u64,
    /// Draws served with a substitute program.
    pub fallbacks: u64,
    pub invalidations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    Live,
    Lost,
}

/// Key → program cache with LRU eviction.
pub struct ProgramCache<B: ProgramBackend> {
    backend: B,
    capacity: usize,
    dump_shaders: bool,

    // ---- Storage ----
    pub(crate) entries: SlotMap<ProgramId, CacheEntry<B>>,

    // ---- Lookups ----
    index: FxHashMap<ShaderStateKey, ProgramId>,
    utilities: FxHashMap<UtilityProgram, ProgramId>,
    /// Failed keys with the generation they failed at. Bounded by `capacity`.
    failed: FxHashMap<ShaderStateKey, (ShadeError, u64)>,
    fallback: FxHashMap<RenderClass, ProgramId>,

    generation: u64,
    state: ContextState,
    stats: CacheStats,
}

impl<B: ProgramBackend> ProgramCache<B> {
    /// Creates an empty cache holding at most `capacity` key programs.
    /// A capacity of zero is treated as one.
    pub fn new(backend: B, capacity: usize) -> Self {
        Self {
            backend,
            capacity: capacity.max(1),
            dump_shaders: false,
            entries: SlotMap::with_key(),
            index: FxHashMap::default(),
            utilities: FxHashMap::default(),
            failed: FxHashMap::default(),
            fallback: FxHashMap::default(),
            generation: 0,
            state: ContextState::Live,
            stats: CacheStats::default(),
        }
    }

    pub fn with_settings(backend: B, settings: &ShaderCacheSettings) -> Self {
        let mut cache = Self::new(backend, settings.capacity);
        cache.dump_shaders = settings.dump_shaders;
        cache
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached key programs. Utility programs are not included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &ShaderStateKey) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state == ContextState::Live
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut B, &mut SlotMap<ProgramId, CacheEntry<B>>) {
        (&mut self.backend, &mut self.entries)
    }

    /// The program behind `id`, if it is still cached.
    pub fn program(&self, id: ProgramId) -> Result<&CompiledProgram<B>> {
        self.entries
            .get(id)
            .map(|entry| &entry.program)
            .ok_or(ShadeError::StaleProgram)
    }

    /// The key `id` was built for; `None` for utility programs.
    #[must_use]
    pub fn key_of(&self, id: ProgramId) -> Option<&ShaderStateKey> {
        self.entries.get(id).and_then(|entry| entry.owner.key())
    }

    // ── Acquisition ──────────────────────────────────────────────────────────

    /// Returns the program for `key`, compiling it on a miss.
    pub fn acquire(&mut self, key: &ShaderStateKey) -> Result<ProgramId> {
        if self.state == ContextState::Lost {
            return Err(ShadeError::ContextLost);
        }
        self.generation += 1;

        if let Some(&id) = self.index.get(key)
            && let Some(entry) = self.entries.get_mut(id)
        {
            entry.last_used = self.generation;
            self.stats.hits += 1;
            return Ok(id);
        }

        if let Some((err, _)) = self.failed.get(key).cloned() {
            return self.substitute(key, err);
        }

        self.stats.misses += 1;
        debug!("Program cache miss: {:?} {key:?}", key.render_class());

        match self.build(key) {
            Ok((program, source_hash)) => {
                while self.index.len() >= self.capacity {
                    if !self.evict_lru() {
                        break;
                    }
                }
                let id = self.entries.insert(CacheEntry {
                    owner: EntryOwner::Key(*key),
                    program: CompiledProgram::new(program, source_hash),
                    last_used: self.generation,
                });
                self.index.insert(*key, id);
                self.fallback.insert(key.render_class(), id);
                Ok(id)
            }
            Err(err) => {
                self.stats.failures += 1;
                self.remember_failure(key, err.clone());
                self.substitute(key, err)
            }
        }
    }

    /// Returns a utility program, compiling it on first use.
    pub fn acquire_utility(&mut self, utility: UtilityProgram) -> Result<ProgramId> {
        if self.state == ContextState::Lost {
            return Err(ShadeError::ContextLost);
        }
        if let Some(&id) = self.utilities.get(&utility) {
            return Ok(id);
        }

        let source = assemble_utility(utility).map_err(|source| ShadeError::Assembly {
            program: utility.label().to_string(),
            source,
        })?;
        let program = self.compile(&source)?;
        let id = self.entries.insert(CacheEntry {
            owner: EntryOwner::Utility(utility),
            program: CompiledProgram::new(program, source.source_hash()),
            last_used: self.generation,
        });
        self.utilities.insert(utility, id);
        debug!("Compiled utility program '{}'", utility.label());
        Ok(id)
    }

    fn build(&mut self, key: &ShaderStateKey) -> Result<(B::Program, u128)> {
        let source = match assemble_program(key) {
            Ok(source) => source,
            Err(source) => {
                error!("Failed to assemble program for {key:?}: {source}");
                return Err(ShadeError::Assembly {
                    program: format!("rdp {:016x}", key.fingerprint()),
                    source,
                });
            }
        };

        match self.compile(&source) {
            Ok(program) => Ok((program, source.source_hash())),
            Err(err) => {
                error!(
                    "{err}\nkey: {key:?}\n--- vertex ---\n{}\n--- fragment ---\n{}",
                    source.vertex, source.fragment
                );
                Err(err)
            }
        }
    }

    fn compile(&mut self, source: &ProgramSource) -> Result<B::Program> {
        if self.dump_shaders {
            trace!(
                "'{}' ({:032x})\n--- vertex ---\n{}\n--- fragment ---\n{}",
                source.label,
                source.source_hash(),
                source.vertex,
                source.fragment
            );
        }
        self.backend
            .compile(source)
            .map_err(|source_err| ShadeError::Program {
                program: source.label.clone(),
                source: source_err,
            })
    }

    /// Records a failed key, forgetting the oldest failure once `capacity`
    /// keys are remembered.
    fn remember_failure(&mut self, key: &ShaderStateKey, err: ShadeError) {
        if self.failed.len() >= self.capacity {
            let oldest = self
                .failed
                .iter()
                .min_by_key(|(_, (_, at))| *at)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                self.failed.remove(&oldest);
                debug!("Forgot failure of {oldest:?}; it will be retried");
            }
        }
        self.failed.insert(*key, (err, self.generation));
    }

    /// Serves the last good program of the key's class in place of a
    /// failed one.
    fn substitute(&mut self, key: &ShaderStateKey, err: ShadeError) -> Result<ProgramId> {
        let class = key.render_class();
        match self.fallback.get(&class).copied() {
            Some(id) if self.entries.contains_key(id) => {
                warn!("Substituting last good {class:?} program for failed key {key:?}");
                self.stats.fallbacks += 1;
                if let Some(entry) = self.entries.get_mut(id) {
                    entry.last_used = self.generation;
                }
                Ok(id)
            }
            _ => Err(err),
        }
    }

    /// Destroys the least recently used key program. Returns `false` when
    /// there is nothing to evict.
    fn evict_lru(&mut self) -> bool {
        let victim = self
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry.owner, EntryOwner::Key(_)))
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| id);
        let Some(id) = victim else {
            return false;
        };
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        if let EntryOwner::Key(key) = entry.owner {
            self.index.remove(&key);
            debug!(
                "Evicted program {key:?} (last used at generation {})",
                entry.last_used
            );
        }
        self.backend.destroy(entry.program.handle);
        self.stats.evictions += 1;
        true
    }

    // ── Invalidation & Context Lifecycle ─────────────────────────────────────

    /// Destroys every program, including utility programs, and forgets all
    /// failures.
    pub fn invalidate_all(&mut self) {
        for (_, entry) in self.entries.drain() {
            self.backend.destroy(entry.program.handle);
        }
        self.forget();
        self.stats.invalidations += 1;
        debug!("Program cache invalidated");
    }

    /// The context is about to go away. Programs are destroyed while it is
    /// still current; `acquire` fails until [`on_context_reset`].
    ///
    /// [`on_context_reset`]: ProgramCache::on_context_reset
    pub fn on_context_destroy(&mut self) {
        if self.state == ContextState::Live {
            self.invalidate_all();
        }
        self.state = ContextState::Lost;
    }

    /// A new context is current. Any handles still cached belong to the old
    /// context and are dropped without calling the backend.
    pub fn on_context_reset(&mut self, backend: B) {
        if !self.entries.is_empty() {
            warn!(
                "Context reset without prior destroy; dropping {} stale programs",
                self.entries.len()
            );
            self.entries.clear();
        }
        self.forget();
        self.backend = backend;
        self.state = ContextState::Live;
        self.stats.invalidations += 1;
        debug!("Program cache reset for new context");
    }

    fn forget(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.utilities.clear();
        self.failed.clear();
        self.fallback.clear();
    }
}

impl<B: ProgramBackend> Drop for ProgramCache<B> {
    fn drop(&mut self) {
        if self.state == ContextState::Live {
            for (_, entry) in self.entries.drain() {
                self.backend.destroy(entry.program.handle);
            }
        }
    }
}
