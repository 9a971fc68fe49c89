//! Fake compilers for driving the engine in tests.
//!
//! Sources are looked up in a [`Registry`] by exact (trimmed) text. Anything
//! not registered fails to compile. Scripts can be gated on a semaphore so a
//! test decides when each evaluation finishes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use vesta_core::{
    Compiler, Compilers, Evaluation, Notebook, Outcome, Plot, PlotCompiler, Program, Relation,
    RelationSet, TokioExecutor,
};

type Body = Arc<dyn Fn(&RelationSet) -> Outcome<RelationSet> + Send + Sync>;
type Render = Arc<dyn Fn(&[Arc<Relation>]) -> Outcome<String> + Send + Sync>;

/// Handle for observing and releasing one registered script.
#[derive(Clone)]
pub struct Script {
    runs: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl Script {
    /// How many evaluations have started.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Let one gated evaluation finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

struct ProgramScript {
    deps: Vec<String>,
    results: Vec<String>,
    body: Body,
    handle: Script,
}

impl Program for ProgramScript {
    fn deps(&self) -> &[String] {
        &self.deps
    }

    fn results(&self) -> &[String] {
        &self.results
    }

    fn evaluate(&self, inputs: RelationSet) -> Evaluation<RelationSet> {
        self.handle.runs.fetch_add(1, Ordering::SeqCst);
        let body = self.body.clone();
        let gate = self.handle.gate.clone();
        async move {
            if let Some(gate) = gate {
                match gate.acquire().await {
                    Ok(permit) => permit.forget(),
                    Err(_) => return Outcome::Cancelled,
                }
            }
            body(&inputs)
        }
        .boxed()
    }
}

struct PlotScript {
    deps: Vec<String>,
    results: Vec<String>,
    render: Render,
    handle: Script,
}

impl Plot for PlotScript {
    fn deps(&self) -> &[String] {
        &self.deps
    }

    fn results(&self) -> &[String] {
        &self.results
    }

    fn evaluate(&self, inputs: Vec<Arc<Relation>>) -> Evaluation<String> {
        self.handle.runs.fetch_add(1, Ordering::SeqCst);
        let render = self.render.clone();
        async move { render(&inputs) }.boxed()
    }
}

/// Source registry acting as both compilers.
#[derive(Clone, Default)]
pub struct Registry {
    programs: Arc<Mutex<HashMap<String, Arc<ProgramScript>>>>,
    plots: Arc<Mutex<HashMap<String, Arc<PlotScript>>>>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compilers(&self) -> Compilers {
        Compilers::new(self.clone(), self.clone())
    }

    /// A notebook on the current tokio runtime.
    pub fn notebook(&self) -> Notebook {
        Notebook::new(
            self.compilers(),
            TokioExecutor::current().expect("tests run inside a tokio runtime"),
        )
    }

    fn register(
        &self,
        source: &str,
        deps: &[&str],
        results: &[&str],
        gated: bool,
        body: Body,
    ) -> Script {
        let handle = Script {
            runs: Arc::new(AtomicUsize::new(0)),
            gate: gated.then(|| Arc::new(Semaphore::new(0))),
        };
        let script = ProgramScript {
            deps: names(deps),
            results: names(results),
            body,
            handle: handle.clone(),
        };
        self.programs
            .lock()
            .unwrap()
            .insert(source.to_string(), Arc::new(script));
        handle
    }

    /// A program computing its results with `body`.
    pub fn program(
        &self,
        source: &str,
        deps: &[&str],
        results: &[&str],
        body: impl Fn(&RelationSet) -> Outcome<RelationSet> + Send + Sync + 'static,
    ) -> Script {
        self.register(source, deps, results, false, Arc::new(body))
    }

    /// Like [`Registry::program`], but each evaluation waits for
    /// [`Script::release`].
    pub fn gated_program(
        &self,
        source: &str,
        deps: &[&str],
        results: &[&str],
        body: impl Fn(&RelationSet) -> Outcome<RelationSet> + Send + Sync + 'static,
    ) -> Script {
        self.register(source, deps, results, true, Arc::new(body))
    }

    /// A program with no inputs defining `name` as literal rows.
    pub fn literal(&self, source: &str, name: &str, rows: Value) -> Script {
        let relation = Arc::new(relation(rows));
        let emitted = name.to_string();
        self.program(source, &[], &[name], move |_| {
            Outcome::Completed(set(&[(emitted.as_str(), relation.clone())]))
        })
    }

    /// A program that always fails with `message`.
    pub fn failing(&self, source: &str, deps: &[&str], results: &[&str], message: &str) -> Script {
        let message = message.to_string();
        self.program(source, deps, results, move |_| Outcome::Failed(message.clone()))
    }

    /// A plot rendering its inputs with `render`.
    pub fn plot(
        &self,
        source: &str,
        deps: &[&str],
        results: &[&str],
        render: impl Fn(&[Arc<Relation>]) -> Outcome<String> + Send + Sync + 'static,
    ) -> Script {
        let handle = Script {
            runs: Arc::new(AtomicUsize::new(0)),
            gate: None,
        };
        let script = PlotScript {
            deps: names(deps),
            results: names(results),
            render: Arc::new(render),
            handle: handle.clone(),
        };
        self.plots
            .lock()
            .unwrap()
            .insert(source.to_string(), Arc::new(script));
        handle
    }
}

impl Compiler for Registry {
    fn compile(&self, source: &str) -> Result<Arc<dyn Program>, String> {
        let programs = self.programs.lock().unwrap();
        match programs.get(source.trim()) {
            Some(script) => Ok(script.clone()),
            None => Err(format!("syntax error: {}", source.trim())),
        }
    }
}

impl PlotCompiler for Registry {
    fn compile(&self, source: &str) -> Result<Arc<dyn Plot>, String> {
        let plots = self.plots.lock().unwrap();
        match plots.get(source.trim()) {
            Some(script) => Ok(script.clone()),
            None => Err("Expected plot cell to start with `name =>` syntax".to_string()),
        }
    }
}

/// Build a relation from a JSON array of objects.
pub fn relation(rows: Value) -> Relation {
    match rows {
        Value::Array(values) => Relation::from_json(values),
        other => panic!("expected array of rows, got {}", other),
    }
}

/// Build a relation set from name/relation pairs.
pub fn set(entries: &[(&str, Arc<Relation>)]) -> RelationSet {
    entries
        .iter()
        .map(|(name, rel)| (name.to_string(), rel.clone()))
        .collect()
}

/// Transitive closure of an `{x, y}` edge relation.
pub fn transitive_closure(edges: &Relation) -> Relation {
    let mut pairs: Vec<(Value, Value)> = Vec::new();
    for row in edges {
        let pair = (row["x"].clone(), row["y"].clone());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    loop {
        let mut added = Vec::new();
        for (x, z) in &pairs {
            for (z2, y) in &pairs {
                let pair = (x.clone(), y.clone());
                if z == z2 && !pairs.contains(&pair) && !added.contains(&pair) {
                    added.push(pair);
                }
            }
        }
        if added.is_empty() {
            break;
        }
        pairs.extend(added);
    }

    Relation::from_json(pairs.into_iter().map(|(x, y)| json!({ "x": x, "y": y })))
}

/// Registers `tc`, reading `edge` and defining `tc` as its closure.
pub fn register_tc(registry: &Registry, source: &str) -> Script {
    registry.program(source, &["edge"], &["tc"], |inputs| {
        let closure = transitive_closure(&inputs["edge"]);
        Outcome::Completed(set(&[("tc", Arc::new(closure))]))
    })
}
