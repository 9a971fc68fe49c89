//! The rebuild pass.
//!
//! ```text
//! changed names ──► invalidate consumers ──► resolve producers + structural errors
//!       ▲                                              │
//!       └── results of every cell demoted this round ◄─┘
//!                                                      │ (nothing demoted)
//!                                                      ▼
//!                                     dispatch ready cells ──► notify
//! ```
//!
//! Every demoted cell, whether invalidated or structurally broken, feeds its
//! result names into the next round, so staleness reaches all transitive
//! consumers. Inside the loop cells only ever move toward stale, and every
//! round that continues demotes at least one cell, so it settles in at most
//! `n + 1` rounds for `n` cells.

use futures::FutureExt;
use rustc_hash::FxHashSet;

use super::Notebook;
use crate::compile::Outcome;
use crate::execute::{Completion, InFlight, RunTicket};
use crate::graph::{self, CellId, Declaration};
use crate::state::{Cell, Phase, RelationSet};

impl Notebook {
    /// Run one rebuild pass, treating `changed` relation names as updated.
    pub(super) fn run_pass(&mut self, mut changed: FxHashSet<String>) {
        let mut round = 0;
        loop {
            round += 1;
            let mut demoted = self.invalidate_consumers(&changed);
            demoted.extend(self.apply_resolution());
            tracing::trace!(round, demoted = demoted.len(), "rebuild round");
            if demoted.is_empty() {
                break;
            }
            if round >= self.config.max_rebuild_rounds {
                tracing::warn!(round, "rebuild hit its round limit before settling");
                break;
            }
            changed = demoted;
        }

        self.dispatch_ready();
        self.listeners.notify();
    }

    /// Demote every cell that reads one of `changed`.
    ///
    /// Returns the result names of cells that were pending or done, so their
    /// own consumers are demoted in the next round.
    fn invalidate_consumers(&mut self, changed: &FxHashSet<String>) -> FxHashSet<String> {
        let mut demoted = FxHashSet::default();
        if changed.is_empty() {
            return demoted;
        }
        let cancel = self.config.cancel_invalidated_runs;
        for (id, cell) in self.cells.iter_mut() {
            let Some(exec) = cell.executable_mut() else {
                continue;
            };
            let reads_changed = exec.unit.deps().iter().any(|dep| changed.contains(dep));
            if reads_changed && exec.demote(cancel) {
                tracing::debug!(cell = %id, "invalidated by upstream change");
                demoted.extend(exec.unit.results().iter().cloned());
            }
        }
        demoted
    }

    /// Recompute producers and structural errors.
    ///
    /// Returns the result names of cells that were pending or done and got
    /// demoted by a structural error.
    fn apply_resolution(&mut self) -> FxHashSet<String> {
        let resolution = {
            let decls: Vec<Declaration<'_>> = self
                .order
                .iter()
                .filter_map(|id| {
                    let exec = self.cells.get(id)?.executable()?;
                    exec.unit.is_ok().then(|| Declaration {
                        id: *id,
                        deps: exec.unit.deps(),
                        results: exec.unit.results(),
                    })
                })
                .collect();
            graph::resolve(&decls)
        };
        let (producers, mut errors) = resolution.into_parts();

        let cancel = self.config.cancel_invalidated_runs;
        let mut demoted = FxHashSet::default();
        for (id, cell) in self.cells.iter_mut() {
            let Some(exec) = cell.executable_mut() else {
                continue;
            };
            exec.structural_error = errors.remove(id);
            if exec.structural_error.is_some() && exec.demote(cancel) {
                tracing::debug!(cell = %id, error = ?exec.structural_error, "demoted by structural error");
                demoted.extend(exec.unit.results().iter().cloned());
            }
        }

        self.producers = producers;
        demoted
    }

    /// Dispatch every eligible cell whose inputs are all available.
    fn dispatch_ready(&mut self) {
        let ready: Vec<(CellId, RelationSet)> = self
            .order
            .iter()
            .filter_map(|id| {
                let exec = self.cells.get(id)?.executable()?;
                if !exec.is_eligible() {
                    return None;
                }
                let inputs = self.gather_inputs(exec.unit.deps())?;
                Some((*id, inputs))
            })
            .collect();

        for (id, inputs) in ready {
            self.dispatch(id, inputs);
        }
    }

    /// Look up every dependency from its producer's last clean output.
    fn gather_inputs(&self, deps: &[String]) -> Option<RelationSet> {
        deps.iter()
            .map(|dep| {
                let producer = self.producers.get(dep)?;
                let relation = self.cells.get(producer)?.executable()?.provides(dep)?;
                Some((dep.clone(), relation.clone()))
            })
            .collect()
    }

    fn dispatch(&mut self, id: CellId, inputs: RelationSet) {
        let ticket = RunTicket(self.next_ticket);
        self.next_ticket += 1;

        let Some(exec) = self.cells.get_mut(&id).and_then(Cell::executable_mut) else {
            return;
        };
        let evaluation = exec.unit.evaluate(inputs);
        let tx = self.tx.clone();
        let task = async move {
            let outcome = evaluation.await;
            // The receiver lives as long as the notebook; a closed channel
            // means nobody is left to care.
            let _ = tx.send(Completion {
                cell: id,
                ticket,
                outcome,
            });
        }
        .boxed();

        tracing::debug!(cell = %id, ?ticket, "dispatching evaluation");
        let handle = self.executor.spawn(task);
        exec.phase = Phase::Pending(InFlight { ticket, handle });
    }

    /// Apply a settled evaluation. Returns false if it was discarded.
    pub(super) fn apply_completion(&mut self, completion: Completion) -> bool {
        let Completion {
            cell: id,
            ticket,
            outcome,
        } = completion;

        let Some(exec) = self.cells.get_mut(&id).and_then(Cell::executable_mut) else {
            tracing::debug!(cell = %id, ?ticket, "discarding completion for deleted cell");
            return false;
        };
        let current = matches!(&exec.phase, Phase::Pending(run) if run.ticket == ticket);
        if !current {
            tracing::debug!(cell = %id, ?ticket, "discarding superseded completion");
            return false;
        }

        let changed = match outcome {
            Outcome::Cancelled => {
                // Parked until an upstream change or an edit; no pass, no notify.
                tracing::debug!(cell = %id, ?ticket, "evaluation cancelled");
                exec.phase = Phase::Parked;
                return false;
            }
            Outcome::Completed(output) => {
                let changed = output.relation_names().into_iter().collect();
                exec.output = Some(output);
                exec.runtime_error = None;
                exec.phase = Phase::Done;
                tracing::debug!(cell = %id, ?ticket, "evaluation completed");
                changed
            }
            Outcome::Failed(message) => {
                tracing::debug!(cell = %id, ?ticket, error = %message, "evaluation failed");
                exec.runtime_error = Some(message);
                exec.phase = Phase::Done;
                FxHashSet::default()
            }
        };

        self.run_pass(changed);
        true
    }
}
