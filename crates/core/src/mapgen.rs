//! Single-shot scheduler: construct a context, seed it once, drain the
//! ordered step list, finalize once, and hand the artifact back.

use crate::context::GenerationContext;
use crate::error::GenError;
use crate::priority::Priority;
use crate::schedule::PriorityList;
use crate::step::GenerationStep;

/// Per-run tracing hooks. Passed into the scheduler at run start with a
/// no-op default; there is no process-wide hook state.
pub trait RunObserver {
    fn run_started(&mut self, _seed: u64) {}
    fn step_applied(&mut self, _priority: &Priority, _name: &str) {}
    fn step_skipped(&mut self, _priority: &Priority, _name: &str) {}
    fn run_finished(&mut self) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// The pipeline scheduler. Steps registered with valid priorities execute
/// in the one deterministic linear order, `(priority ascending,
/// registration order)`, against a context built fresh for each run.
pub struct MapGen<C> {
    new_context: Box<dyn Fn() -> C>,
    steps: PriorityList<Box<dyn GenerationStep>>,
}

impl<C: GenerationContext> MapGen<C> {
    pub fn new(new_context: impl Fn() -> C + 'static) -> Self {
        Self { new_context: Box::new(new_context), steps: PriorityList::new() }
    }

    /// Registers a step under `priority`. Invalid priorities are rejected.
    pub fn register(
        &mut self,
        priority: Priority,
        step: impl GenerationStep + 'static,
    ) -> Result<(), GenError> {
        self.steps.add(priority, Box::new(step))?;
        Ok(())
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Runs the whole pipeline for `seed`. The run is atomic from the
    /// caller's perspective: the first step error aborts it, and no partial
    /// context is returned.
    pub fn run(&self, seed: u64) -> Result<C, GenError> {
        self.run_observed(seed, &mut NoopObserver)
    }

    pub fn run_observed(
        &self,
        seed: u64,
        observer: &mut dyn RunObserver,
    ) -> Result<C, GenError> {
        let mut ctx = (self.new_context)();
        ctx.init_seed(seed)?;
        observer.run_started(seed);

        for (priority, step) in self.steps.ordered() {
            // Capability mismatches are skipped silently by policy, never
            // raised; the observer keeps the skip visible.
            if step.can_apply(&ctx) {
                step.apply(&mut ctx)?;
                observer.step_applied(priority, step.name());
            } else {
                observer.step_skipped(priority, step.name());
            }
        }

        ctx.finalize();
        observer.run_finished();
        Ok(ctx)
    }
}
