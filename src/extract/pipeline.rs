//! Ordered extractor pipelines
//!
//! A pipeline is an ordered name → extractor mapping. Running it against a
//! context produces a [`Record`] whose fields appear in declared order. The
//! run is all-or-nothing: the first failing extractor fails the whole record.

use crate::extract::record::{FieldValue, Record};
use crate::{ExtractResult, FieldError};
use std::fmt;

/// Computes one field from a context
///
/// Implemented for every `Fn(&C) -> ExtractResult<FieldValue>`, so plain
/// functions and closures can be plugged in directly.
pub trait Extractor<C>: Send + Sync {
    fn extract(&self, ctx: &C) -> ExtractResult<FieldValue>;
}

impl<C, F> Extractor<C> for F
where
    F: Fn(&C) -> ExtractResult<FieldValue> + Send + Sync,
{
    fn extract(&self, ctx: &C) -> ExtractResult<FieldValue> {
        self(ctx)
    }
}

/// Ordered collection of named extractors over context `C`
pub struct Pipeline<C> {
    steps: Vec<(&'static str, Box<dyn Extractor<C>>)>,
}

impl<C> Pipeline<C> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Builder form of [`Pipeline::set`]
    pub fn with(mut self, name: &'static str, extractor: impl Extractor<C> + 'static) -> Self {
        self.set(name, extractor);
        self
    }

    /// Appends an extractor, or swaps it in place if `name` is already declared
    ///
    /// Swapping keeps the field's position, so overriding an extractor never
    /// reorders the output.
    pub fn set(&mut self, name: &'static str, extractor: impl Extractor<C> + 'static) {
        let boxed: Box<dyn Extractor<C>> = Box::new(extractor);
        match self.steps.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = boxed,
            None => self.steps.push((name, boxed)),
        }
    }

    /// Declared field names, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(n, _)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every extractor in order against the same context
    pub fn run(&self, ctx: &C) -> Result<Record, FieldError> {
        let mut record = Record::new();

        for (name, extractor) in &self.steps {
            let value = extractor
                .extract(ctx)
                .map_err(|source| FieldError {
                    field: *name,
                    source,
                })?;

            tracing::debug!(field = *name, value = %value.summary(), "Extracted field");
            record.insert(*name, value);
        }

        Ok(record)
    }
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("fields", &self.names())
            .finish()
    }
}
