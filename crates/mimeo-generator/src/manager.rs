//! Session-scoped registry of execution contexts.
//!
//! A [`ContextManager`] is only usable while a [`Session`] is open. The
//! session guard resets all generation state when it is created and marks
//! the manager inactive again when it is dropped, on every exit path.

use crate::context::{ExecutionContext, Iteration};
use crate::error::{ContextError, RenderError};
use crate::utils::key::random_key;
use indexmap::IndexMap;
use mimeo_core::{Atom, MimeoConfig, Node, RefConfig, RefType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Registry of contexts, variables and the reference cache of one
/// generation pass.
#[derive(Debug)]
pub struct ContextManager {
    alive: bool,
    contexts: HashMap<String, ExecutionContext>,
    current: Option<String>,
    active: Vec<String>,
    vars: IndexMap<String, Node>,
    refs: IndexMap<String, RefConfig>,
    ref_cache: HashMap<(String, String), Vec<Atom>>,
    seed: Option<u64>,
    rng: StdRng,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(IndexMap::new(), IndexMap::new(), None)
    }
}

impl ContextManager {
    pub fn new(
        vars: IndexMap<String, Node>,
        refs: IndexMap<String, RefConfig>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            alive: false,
            contexts: HashMap::new(),
            current: None,
            active: Vec::new(),
            vars,
            refs,
            ref_cache: HashMap::new(),
            seed,
            rng: new_rng(seed),
        }
    }

    /// Manager carrying the vars, refs and seed of a configuration.
    pub fn from_config(config: &MimeoConfig) -> Self {
        Self::new(config.vars.clone(), config.refs.clone(), config.seed)
    }

    /// Open a session with fresh contexts, caches and RNG.
    pub fn start_session(&mut self) -> Session<'_> {
        self.contexts.clear();
        self.current = None;
        self.active.clear();
        self.ref_cache.clear();
        self.rng = new_rng(self.seed);
        self.alive = true;
        debug!(seed = ?self.seed, "Context manager session opened");
        Session { manager: self }
    }

    fn close(&mut self) {
        self.alive = false;
        self.current = None;
        self.active.clear();
        self.contexts.clear();
        self.ref_cache.clear();
        debug!("Context manager session closed");
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn ensure_alive(&self) -> Result<(), ContextError> {
        if self.alive {
            Ok(())
        } else {
            Err(ContextError::NotAlive)
        }
    }

    /// Context registered under `name`, created on first use.
    pub fn get_context(&mut self, name: &str) -> Result<&mut ExecutionContext, ContextError> {
        self.ensure_alive()?;
        Ok(self
            .contexts
            .entry(name.to_string())
            .or_insert_with(|| ExecutionContext::new(name)))
    }

    /// The current context, `None` before any switch.
    pub fn get_current_context(&self) -> Result<Option<&ExecutionContext>, ContextError> {
        self.ensure_alive()?;
        Ok(self
            .current
            .as_deref()
            .and_then(|name| self.contexts.get(name)))
    }

    pub fn current_context_mut(&mut self) -> Result<&mut ExecutionContext, ContextError> {
        self.ensure_alive()?;
        let name = self.current.as_deref().ok_or(ContextError::NoCurrentContext)?;
        self.contexts
            .get_mut(name)
            .ok_or(ContextError::NoCurrentContext)
    }

    fn current_name(&self) -> Result<&str, ContextError> {
        self.ensure_alive()?;
        self.current.as_deref().ok_or(ContextError::NoCurrentContext)
    }

    /// Make `name` the current context, creating it if needed.
    pub fn set_current_context(&mut self, name: &str) -> Result<(), ContextError> {
        self.get_context(name)?;
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Run `f` with `name` as the current context, then restore the previous
    /// one whether `f` succeeds or fails.
    pub fn context_switch<T, E, F>(&mut self, name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<ContextError>,
    {
        let previous = self.current.clone();
        self.set_current_context(name)?;
        self.active.push(name.to_string());
        debug!(from = ?previous, to = name, "Switched context");

        let result = f(self);
        self.active.pop();
        self.current = previous;
        result
    }

    /// Whether a [`context_switch`](Self::context_switch) into `name` is
    /// still running.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|active| active == name)
    }

    /// Start a new iteration in the current context.
    pub fn next_iteration(&mut self) -> Result<&Iteration, ContextError> {
        self.ensure_alive()?;
        let key = random_key(&mut self.rng);
        let name = self.current.as_deref().ok_or(ContextError::NoCurrentContext)?;
        let context = self
            .contexts
            .get_mut(name)
            .ok_or(ContextError::NoCurrentContext)?;
        Ok(context.next_iteration(key.to_string()))
    }

    pub fn curr_iteration(&self) -> Result<&Iteration, ContextError> {
        self.get_current_context()?
            .ok_or(ContextError::NoCurrentContext)?
            .curr_iteration()
    }

    pub fn curr_iteration_mut(&mut self) -> Result<&mut Iteration, ContextError> {
        self.current_context_mut()?.curr_iteration_mut()
    }

    /// Whether some reference targets `field` of the current context.
    pub fn is_referenced(&self, field: &str) -> Result<bool, ContextError> {
        let context = self.current_name()?;
        Ok(self
            .refs
            .values()
            .any(|reference| reference.context == context && reference.field == field))
    }

    /// Record a rendered value of `field` in the current context when it is
    /// referenced.
    pub fn cache_ref(&mut self, field: &str, value: &Atom) -> Result<(), ContextError> {
        if !self.is_referenced(field)? {
            return Ok(());
        }
        let context = self.current_name()?.to_string();
        self.ref_cache
            .entry((context, field.to_string()))
            .or_default()
            .push(value.clone());
        Ok(())
    }

    pub fn has_ref(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    /// Resolve a configured reference against the cached values.
    pub fn get_ref(&mut self, name: &str) -> Result<Atom, RenderError> {
        self.ensure_alive()?;
        let reference = self
            .refs
            .get(name)
            .ok_or_else(|| RenderError::ReferenceNotFound(name.to_string()))?;
        let values = self
            .ref_cache
            .get(&(reference.context.clone(), reference.field.clone()))
            .filter(|values| !values.is_empty())
            .ok_or_else(|| RenderError::NonPopulatedReference(name.to_string()))?;

        match reference.kind {
            RefType::Any => Ok(values[self.rng.random_range(0..values.len())].clone()),
            RefType::Parallel => {
                let context = self.current.as_deref().ok_or(ContextError::NoCurrentContext)?;
                let iteration = self
                    .contexts
                    .get(context)
                    .ok_or(ContextError::NoCurrentContext)?
                    .curr_iteration()?
                    .id();
                usize::try_from(iteration - 1)
                    .ok()
                    .and_then(|idx| values.get(idx))
                    .cloned()
                    .ok_or_else(|| RenderError::NonPopulatedReference(name.to_string()))
            }
        }
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Value node of a configured variable.
    pub fn get_var(&self, name: &str) -> Result<Node, RenderError> {
        self.ensure_alive()?;
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| RenderError::VarNotFound(name.to_string()))
    }

    /// Draw an unused index of a pool for the current context.
    pub fn draw_unique(&mut self, class: &str, pool_size: usize) -> Result<Option<usize>, ContextError> {
        self.ensure_alive()?;
        let name = self.current.as_deref().ok_or(ContextError::NoCurrentContext)?;
        let context = self
            .contexts
            .get_mut(name)
            .ok_or(ContextError::NoCurrentContext)?;
        Ok(context.unique_draw(class, pool_size, &mut self.rng))
    }

    /// Session random number generator.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

fn new_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// An open session of a [`ContextManager`].
///
/// Dereferences to the manager; dropping it ends the session.
#[derive(Debug)]
pub struct Session<'a> {
    manager: &'a mut ContextManager,
}

impl Deref for Session<'_> {
    type Target = ContextManager;

    fn deref(&self) -> &ContextManager {
        self.manager
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut ContextManager {
        self.manager
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.manager.close();
    }
}
