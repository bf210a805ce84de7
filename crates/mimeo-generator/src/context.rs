//! Execution contexts and their iterations.
//!
//! An [`ExecutionContext`] serves one template level. It owns the id
//! counters used by `auto_increment`, the sequence of [`Iteration`]s (one
//! per generated record) and the bookkeeping of unique dataset draws.

use crate::error::ContextError;
use mimeo_core::Atom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// One repetition of a template within a context.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    id: u64,
    key: String,
    special_fields: HashMap<String, Atom>,
}

impl Iteration {
    fn new(id: u64, key: String) -> Self {
        Self {
            id,
            key,
            special_fields: HashMap::new(),
        }
    }

    /// Ordinal of the iteration within its context, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Session-unique key of the iteration.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store a special field value. Each name can be set once per iteration.
    pub fn add_special_field(&mut self, name: &str, value: Atom) -> Result<(), ContextError> {
        if self.special_fields.contains_key(name) {
            return Err(ContextError::SpecialFieldAlreadySet(name.to_string()));
        }
        self.special_fields.insert(name.to_string(), value);
        Ok(())
    }

    pub fn special_field(&self, name: &str) -> Option<&Atom> {
        self.special_fields.get(name)
    }
}

/// Per-template-level generation state.
#[derive(Debug)]
pub struct ExecutionContext {
    name: String,
    id_counter: u64,
    pattern_counters: HashMap<String, u64>,
    iterations: Vec<Iteration>,
    drawn: HashMap<String, HashSet<usize>>,
}

impl ExecutionContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_counter: 0,
            pattern_counters: HashMap::new(),
            iterations: Vec::new(),
            drawn: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advance the primary id counter.
    pub fn next_id(&mut self) -> u64 {
        self.id_counter += 1;
        self.id_counter
    }

    pub fn curr_id(&self) -> u64 {
        self.id_counter
    }

    /// Step the primary id counter back.
    pub fn prev_id(&mut self) -> Result<u64, ContextError> {
        if self.id_counter == 0 {
            return Err(ContextError::MinimumIdentifierReached(self.name.clone()));
        }
        self.id_counter -= 1;
        Ok(self.id_counter)
    }

    /// Advance the counter dedicated to a custom `auto_increment` pattern.
    pub fn next_pattern_id(&mut self, pattern: &str) -> u64 {
        let counter = self.pattern_counters.entry(pattern.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Append a new iteration identified by `key`.
    pub fn next_iteration(&mut self, key: impl Into<String>) -> &Iteration {
        let id = self.iterations.last().map_or(1, |last| last.id + 1);
        self.iterations.push(Iteration::new(id, key.into()));
        &self.iterations[self.iterations.len() - 1]
    }

    pub fn curr_iteration(&self) -> Result<&Iteration, ContextError> {
        self.iterations
            .last()
            .ok_or_else(|| ContextError::UninitializedIteration(self.name.clone()))
    }

    pub fn curr_iteration_mut(&mut self) -> Result<&mut Iteration, ContextError> {
        let name = &self.name;
        self.iterations
            .last_mut()
            .ok_or_else(|| ContextError::UninitializedIteration(name.clone()))
    }

    /// Iteration with the given ordinal.
    pub fn get_iteration(&self, id: u64) -> Result<&Iteration, ContextError> {
        self.iterations
            .iter()
            .rev()
            .find(|iteration| iteration.id == id)
            .ok_or_else(|| ContextError::IterationNotFound {
                context: self.name.clone(),
                iteration: id,
            })
    }

    pub fn iterations(&self) -> &[Iteration] {
        &self.iterations
    }

    /// Drop all iterations so numbering restarts at 1.
    pub fn clear_iterations(&mut self) {
        self.iterations.clear();
    }

    /// Move all iterations out, leaving numbering to restart at 1.
    pub fn take_iterations(&mut self) -> Vec<Iteration> {
        std::mem::take(&mut self.iterations)
    }

    /// Replace the iterations with ones previously taken out.
    pub fn restore_iterations(&mut self, iterations: Vec<Iteration>) {
        self.iterations = iterations;
    }

    /// Draw an index in `0..pool_size` not yet drawn for `class` in this
    /// context. Returns `None` once every index has been used.
    pub fn unique_draw<R: Rng>(&mut self, class: &str, pool_size: usize, rng: &mut R) -> Option<usize> {
        let drawn = self.drawn.entry(class.to_string()).or_default();
        if drawn.len() < pool_size / 2 {
            loop {
                let index = rng.random_range(0..pool_size);
                if drawn.insert(index) {
                    return Some(index);
                }
            }
        }

        let available: Vec<usize> = (0..pool_size).filter(|idx| !drawn.contains(idx)).collect();
        if available.is_empty() {
            return None;
        }

        let index = available[rng.random_range(0..available.len())];
        drawn.insert(index);
        Some(index)
    }
}
