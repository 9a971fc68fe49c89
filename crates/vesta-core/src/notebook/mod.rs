//! The notebook: cell store, rebuild scheduler and change notifier.
//!
//! Every mutation (insert, delete, edit, load) runs one rebuild pass, and so
//! does every applied completion. A pass resolves producers and structural
//! errors, demotes invalidated cells, dispatches every cell whose inputs are
//! ready, and ends by notifying listeners once. Toggling visibility only
//! notifies.
//!
//! All state lives on the notebook owner's thread of control. Evaluations
//! run on an [`Executor`] and report back through a channel; nothing touches
//! cell state until the owner drains that channel with
//! [`Notebook::poll_completions`], [`Notebook::next_completion`] or
//! [`Notebook::settle`].

mod notify;
mod scheduler;

pub use notify::{ListenerId, Listeners};

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::mpsc;

use crate::compile::Compilers;
use crate::config::EngineConfig;
use crate::document::CellData;
use crate::error::{Error, Result};
use crate::execute::{Completion, Executor};
use crate::graph::CellId;
use crate::state::{Cell, RunStatus};

/// A reactive notebook.
pub struct Notebook {
    /// Display order.
    order: Vec<CellId>,
    /// Cell state by id. Keys match `order` exactly.
    cells: FxHashMap<CellId, Cell>,
    /// Next cell id to assign
    next_id: usize,
    /// Next run ticket to assign
    next_ticket: u64,
    /// Routing table from the last rebuild.
    producers: FxHashMap<String, CellId>,
    compilers: Compilers,
    executor: Arc<dyn Executor>,
    config: EngineConfig,
    listeners: Listeners,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Notebook {
    /// Create an empty notebook with the default configuration.
    pub fn new(compilers: Compilers, executor: impl Executor + 'static) -> Self {
        Self::with_config(compilers, executor, EngineConfig::default())
    }

    pub fn with_config(
        compilers: Compilers,
        executor: impl Executor + 'static,
        config: EngineConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            order: Vec::new(),
            cells: FxHashMap::default(),
            next_id: 0,
            next_ticket: 0,
            producers: FxHashMap::default(),
            compilers,
            executor: Arc::new(executor),
            config,
            listeners: Listeners::new(),
            tx,
            rx,
        }
    }

    /// Create a notebook holding `data`, in order.
    pub fn from_data(
        compilers: Compilers,
        executor: impl Executor + 'static,
        data: impl IntoIterator<Item = CellData>,
    ) -> Self {
        let mut notebook = Self::new(compilers, executor);
        notebook.load(data);
        notebook
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert a cell at `index` in display order.
    ///
    /// Executable source is compiled immediately; the cell starts stale.
    pub fn insert_at(&mut self, index: usize, data: CellData) -> Result<CellId> {
        if index > self.order.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.order.len(),
            });
        }
        let id = self.store(index, data);
        let changed = self.results_of(id);
        tracing::debug!(cell = %id, index, "inserted cell");
        self.run_pass(changed);
        Ok(id)
    }

    /// Append a cell after the last one.
    pub fn insert_at_end(&mut self, data: CellData) -> CellId {
        let id = self.store(self.order.len(), data);
        let changed = self.results_of(id);
        tracing::debug!(cell = %id, "appended cell");
        self.run_pass(changed);
        id
    }

    /// Remove a cell, cancelling its in-flight run first.
    pub fn delete(&mut self, id: CellId) -> Result<CellData> {
        let mut cell = self.cells.remove(&id).ok_or(Error::UnknownCell(id))?;
        cell.cancel_run();
        self.order.retain(|other| *other != id);

        let changed = cell.results().iter().cloned().collect();
        tracing::debug!(cell = %id, "deleted cell");
        self.run_pass(changed);
        Ok(cell.to_data())
    }

    /// Replace a cell's source.
    ///
    /// Cancels the in-flight run, recompiles, clears output and errors and
    /// resets the cell to stale. Consumers of both the old and the new
    /// result names are invalidated.
    pub fn edit(&mut self, id: CellId, source: impl Into<String>) -> Result<()> {
        let cell = self.cells.get_mut(&id).ok_or(Error::UnknownCell(id))?;
        let mut changed: FxHashSet<String> = cell.results().iter().cloned().collect();
        cell.recompile(source.into(), &self.compilers);
        changed.extend(cell.results().iter().cloned());

        tracing::debug!(cell = %id, "edited cell");
        self.run_pass(changed);
        Ok(())
    }

    /// Flip a cell's visibility. Returns the new `hidden` flag.
    ///
    /// Run state is untouched and no rebuild happens.
    pub fn toggle_visibility(&mut self, id: CellId) -> Result<bool> {
        let cell = self.cells.get_mut(&id).ok_or(Error::UnknownCell(id))?;
        let hidden = !cell.hidden();
        cell.set_hidden(hidden);
        self.listeners.notify();
        Ok(hidden)
    }

    /// Replace the whole notebook with `data`.
    ///
    /// All in-flight runs are cancelled. Listeners are notified once.
    pub fn load(&mut self, data: impl IntoIterator<Item = CellData>) {
        for cell in self.cells.values_mut() {
            cell.cancel_run();
        }
        self.cells.clear();
        self.order.clear();
        self.producers.clear();

        for cell in data {
            self.store(self.order.len(), cell);
        }
        tracing::debug!(cells = self.order.len(), "loaded notebook");
        self.run_pass(FxHashSet::default());
    }

    /// Export every cell, in display order.
    pub fn export(&self) -> Vec<CellData> {
        self.iter().map(|(_, cell)| cell.to_data()).collect()
    }

    /// Run a rebuild pass without any mutation.
    ///
    /// A second call in a row changes nothing but still notifies.
    pub fn rebuild(&mut self) {
        self.run_pass(FxHashSet::default());
    }

    /// Cells in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.cells.get(id).map(|cell| (*id, cell)))
    }

    /// Cell ids in display order.
    pub fn ids(&self) -> &[CellId] {
        &self.order
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Display index of a cell.
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The routing table from relation name to producing cell.
    pub fn producers(&self) -> &FxHashMap<String, CellId> {
        &self.producers
    }

    pub fn producer(&self, name: &str) -> Option<CellId> {
        self.producers.get(name).copied()
    }

    /// Number of cells with an evaluation in flight.
    pub fn pending_count(&self) -> usize {
        self.cells
            .values()
            .filter(|cell| cell.status() == Some(RunStatus::Pending))
            .count()
    }

    /// Whether no evaluation is in flight.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, callback: impl FnMut() + Send + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Number of notifications fired so far.
    pub fn revision(&self) -> u64 {
        self.listeners.revision()
    }

    /// Apply every completion that has already arrived, without waiting.
    ///
    /// Returns how many were applied; discarded ones are not counted.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns whether it was applied. Completions of cancelled or
    /// superseded runs are discarded.
    pub async fn next_completion(&mut self) -> bool {
        match self.rx.recv().await {
            Some(completion) => self.apply_completion(completion),
            None => false,
        }
    }

    /// Apply completions until no evaluation is in flight.
    pub async fn settle(&mut self) {
        self.poll_completions();
        while !self.is_settled() {
            self.next_completion().await;
        }
    }

    /// Compile and place a cell without running a pass.
    fn store(&mut self, index: usize, data: CellData) -> CellId {
        let id = CellId::new(self.next_id);
        self.next_id += 1;
        let cell = Cell::compile(data, &self.compilers);
        self.cells.insert(id, cell);
        self.order.insert(index, id);
        id
    }

    fn results_of(&self, id: CellId) -> FxHashSet<String> {
        self.cells
            .get(&id)
            .map(|cell| cell.results().iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("order", &self.order)
            .field("producers", &self.producers)
            .field("config", &self.config)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
