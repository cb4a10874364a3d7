//! Generation step contract and the weighted composite step.

use crate::context::{CapabilitySet, GenerationContext};
use crate::error::GenError;

/// A unit of generation logic, applied in scheduler-determined order.
///
/// `apply` on a context that does not satisfy `requires` is a silent no-op
/// by policy: one flat step list may target heterogeneous context types, and
/// the scheduler filters mismatches through `can_apply` instead of failing.
pub trait GenerationStep {
    /// Stable name used by run observers.
    fn name(&self) -> &str;

    /// Capabilities the step needs from its context; empty runs anywhere.
    fn requires(&self) -> CapabilitySet {
        CapabilitySet::empty()
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError>;

    fn can_apply(&self, ctx: &dyn GenerationContext) -> bool {
        ctx.capabilities().contains(self.requires())
    }
}

/// Composite step: rolls one weighted winner from the context's RNG and
/// delegates to it. The scheduler does not special-case composites; the
/// single roll is an ordinary stream draw, so the pick is reproducible.
pub struct WeightedPick {
    name: String,
    choices: Vec<(u32, Box<dyn GenerationStep>)>,
}

impl WeightedPick {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), choices: Vec::new() }
    }

    pub fn with(mut self, weight: u32, step: impl GenerationStep + 'static) -> Self {
        self.choices.push((weight, Box::new(step)));
        self
    }
}

impl GenerationStep for WeightedPick {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let total: u64 = self.choices.iter().map(|(weight, _)| u64::from(*weight)).sum();
        if total == 0 {
            return Ok(());
        }
        let mut roll = ctx.rng().next_below(total as i64)? as u64;
        for (weight, step) in &self.choices {
            if roll < u64::from(*weight) {
                // The winner follows the same skip policy as the scheduler.
                if step.can_apply(ctx) {
                    return step.apply(ctx);
                }
                return Ok(());
            }
            roll -= u64::from(*weight);
        }
        Ok(())
    }
}
