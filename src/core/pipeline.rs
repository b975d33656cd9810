//! Ordered validation stages threaded through an explicit context.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::error::RecordError;
use super::settings::Settings;
use super::types::Record;

/// State handed from stage to stage.
///
/// Stages may mutate `record` (defaults, totals, status) but only read from
/// `host`.
pub struct Context<'a, H: ?Sized> {
    pub record: &'a mut Record,
    pub host: &'a H,
    pub settings: &'a Settings,
    pub today: NaiveDate,
}

impl<'a, H: ?Sized> Context<'a, H> {
    pub fn new(record: &'a mut Record, host: &'a H, settings: &'a Settings, today: NaiveDate) -> Self {
        Self {
            record,
            host,
            settings,
            today,
        }
    }
}

/// A single validation step.
pub type Stage<H> = fn(&mut Context<'_, H>) -> Result<(), RecordError>;

/// Fixed, ordered list of stages. The first failure aborts the run.
pub struct Pipeline<H: ?Sized> {
    stages: Vec<(&'static str, Stage<H>)>,
}

impl<H: ?Sized> Default for Pipeline<H> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<H: ?Sized> Pipeline<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named stage.
    pub fn stage(mut self, name: &'static str, stage: Stage<H>) -> Self {
        self.stages.push((name, stage));
        self
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }

    pub fn run(&self, ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
        for (name, stage) in &self.stages {
            debug!(record = %ctx.record.name, stage = name, "running validation stage");
            if let Err(e) = stage(ctx) {
                warn!(record = %ctx.record.name, stage = name, error = %e, "validation rejected");
                return Err(e);
            }
        }
        Ok(())
    }
}
