//! The current formula, shared between the control thread (which compiles)
//! and the audio thread (which only reads).
//!
//! Publication is a single atomic pointer swap, so a reader always sees one
//! complete `CompiledFormula`, old or new, and never waits on a lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::{ArcSwap, Guard};
use tracing::{info, warn};

use crate::compiler::compile;
use crate::error::SyntaxError;
use crate::program::Program;

/// Formula text shown to a fresh instance.
pub const DEFAULT_FORMULA: &str = "x";

/// A successfully compiled formula together with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    pub text: String,
    pub program: Program,
    /// Bumped on every accepted edit. The engine resets its clock and hold
    /// state when it sees a new value.
    pub generation: u64,
}

impl CompiledFormula {
    fn identity(generation: u64) -> Self {
        CompiledFormula {
            text: DEFAULT_FORMULA.to_string(),
            program: Program::identity(),
            generation,
        }
    }
}

#[derive(Debug)]
pub struct FormulaStore {
    current: ArcSwap<CompiledFormula>,
    next_generation: AtomicU64,
}

impl FormulaStore {
    /// A store holding the identity formula `x`.
    pub fn new() -> Self {
        FormulaStore {
            current: ArcSwap::from_pointee(CompiledFormula::identity(0)),
            next_generation: AtomicU64::new(1),
        }
    }

    /// A store holding `text`, or the compile error.
    pub fn with_formula(text: &str) -> Result<Self, SyntaxError> {
        let store = FormulaStore::new();
        store.set_formula(text)?;
        Ok(store)
    }

    /// Compile `text` and publish it. On error the current formula stays in
    /// place. Returns the new generation.
    pub fn set_formula(&self, text: &str) -> Result<u64, SyntaxError> {
        let program = match compile(text) {
            Ok(program) => program,
            Err(err) => {
                warn!(formula = text, error = %err, "formula rejected, keeping previous program");
                return Err(err);
            }
        };
        let generation = self.bump_generation();
        info!(formula = text, generation, postfix = %program, "formula accepted");
        self.current.store(Arc::new(CompiledFormula {
            text: text.to_string(),
            program,
            generation,
        }));
        Ok(generation)
    }

    /// Go back to the identity formula.
    pub fn reset(&self) -> u64 {
        let generation = self.bump_generation();
        self.current
            .store(Arc::new(CompiledFormula::identity(generation)));
        generation
    }

    /// Lock-free snapshot of the current formula.
    pub fn current(&self) -> Guard<Arc<CompiledFormula>> {
        self.current.load()
    }

    /// Text of the current formula, for persistence.
    pub fn text(&self) -> String {
        self.current.load().text.clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    fn bump_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for FormulaStore {
    fn default() -> Self {
        FormulaStore::new()
    }
}
