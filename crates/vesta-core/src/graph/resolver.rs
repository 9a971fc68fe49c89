//! Dependency resolution over declared relation names.
//!
//! Resolution is a pure function of the `(id, deps, results)` triples of
//! every successfully compiled cell. It decides which cell is the single
//! producer of each relation name and classifies structural errors:
//!
//! 1. **Duplicate producers**: every cell declaring a name that some other
//!    cell also declares.
//! 2. **Orphans**: a surviving cell with a dependency that has no single
//!    producer. The first missing dependency is reported.
//! 3. **Cycles**: surviving cells whose dependencies loop back on
//!    themselves, found with strongly connected components.

use std::collections::VecDeque;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::types::{CellId, Declaration, StructuralError};

/// Outcome of one resolution pass.
#[derive(Debug, Default, Clone)]
pub struct Resolution {
    /// Relation name to its single producing cell.
    producers: FxHashMap<String, CellId>,
    /// Structural error per affected cell.
    errors: FxHashMap<CellId, StructuralError>,
}

impl Resolution {
    /// The cell producing `name`, if exactly one cell declares it.
    pub fn producer(&self, name: &str) -> Option<CellId> {
        self.producers.get(name).copied()
    }

    /// The routing table from relation name to producing cell.
    pub fn producers(&self) -> &FxHashMap<String, CellId> {
        &self.producers
    }

    /// The structural error recorded for a cell, if any.
    pub fn error(&self, id: CellId) -> Option<&StructuralError> {
        self.errors.get(&id)
    }

    /// Number of cells carrying a structural error.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn into_parts(self) -> (FxHashMap<String, CellId>, FxHashMap<CellId, StructuralError>) {
        (self.producers, self.errors)
    }
}

/// Resolve producers and structural errors for a set of declarations.
///
/// Declarations should be given in display order; it only affects which
/// name is reported when a cell collides on several names at once.
pub fn resolve(decls: &[Declaration<'_>]) -> Resolution {
    let mut declared: FxHashMap<&str, Vec<CellId>> = FxHashMap::default();
    for decl in decls {
        for name in decl.results {
            let ids = declared.entry(name.as_str()).or_default();
            if !ids.contains(&decl.id) {
                ids.push(decl.id);
            }
        }
    }

    let mut errors = FxHashMap::default();

    for decl in decls {
        let duplicate = decl
            .results
            .iter()
            .find(|name| declared.get(name.as_str()).is_some_and(|ids| ids.len() > 1));
        if let Some(name) = duplicate {
            errors.insert(decl.id, StructuralError::DuplicateRelation(name.clone()));
        }
    }

    let producers: FxHashMap<String, CellId> = declared
        .iter()
        .filter(|(_, ids)| ids.len() == 1)
        .map(|(name, ids)| (name.to_string(), ids[0]))
        .collect();

    for decl in decls {
        if errors.contains_key(&decl.id) {
            continue;
        }
        let missing = decl
            .deps
            .iter()
            .find(|dep| !producers.contains_key(dep.as_str()));
        if let Some(dep) = missing {
            errors.insert(decl.id, StructuralError::MissingDependency(dep.clone()));
        }
    }

    let cycles = detect_cycles(decls, &producers, &errors);
    errors.extend(cycles);

    Resolution { producers, errors }
}

/// Find cells taking part in dependency cycles among the surviving cells.
fn detect_cycles(
    decls: &[Declaration<'_>],
    producers: &FxHashMap<String, CellId>,
    errors: &FxHashMap<CellId, StructuralError>,
) -> Vec<(CellId, StructuralError)> {
    // Edges go from producer to consumer, labelled with the relation name.
    let mut graph: DiGraph<CellId, String> = DiGraph::new();
    let mut nodes: FxHashMap<CellId, NodeIndex> = FxHashMap::default();

    for decl in decls.iter().filter(|d| !errors.contains_key(&d.id)) {
        nodes.insert(decl.id, graph.add_node(decl.id));
    }

    for decl in decls {
        let Some(&consumer) = nodes.get(&decl.id) else {
            continue;
        };
        for dep in decl.deps {
            let producer = producers.get(dep.as_str()).and_then(|id| nodes.get(id));
            if let Some(&producer) = producer {
                graph.add_edge(producer, consumer, dep.clone());
            }
        }
    }

    let mut found = Vec::new();
    for scc in kosaraju_scc(&graph) {
        let cyclic = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
        if !cyclic {
            continue;
        }
        let members: FxHashSet<NodeIndex> = scc.iter().copied().collect();
        // Report the loop starting from the member that appears first.
        let start = scc
            .iter()
            .copied()
            .min_by_key(|idx| graph[*idx])
            .unwrap_or(scc[0]);
        let names = cycle_names(&graph, &members, start);
        for idx in scc {
            found.push((graph[idx], StructuralError::Cycle(names.clone())));
        }
    }
    found
}

/// Relation names along the shortest loop from `start` back to itself,
/// closed with the first name repeated.
fn cycle_names(
    graph: &DiGraph<CellId, String>,
    members: &FxHashSet<NodeIndex>,
    start: NodeIndex,
) -> Vec<String> {
    use petgraph::visit::EdgeRef;

    let mut parent: FxHashMap<NodeIndex, (NodeIndex, String)> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);
    let mut closing = None;

    'search: while let Some(node) = queue.pop_front() {
        for edge in graph.edges(node) {
            let next = edge.target();
            if !members.contains(&next) {
                continue;
            }
            if next == start {
                closing = Some((node, edge.weight().clone()));
                break 'search;
            }
            if !parent.contains_key(&next) {
                parent.insert(next, (node, edge.weight().clone()));
                queue.push_back(next);
            }
        }
    }

    let mut names = Vec::new();
    if let Some((mut node, last)) = closing {
        names.push(last);
        while node != start {
            let Some((prev, name)) = parent.get(&node) else {
                break;
            };
            names.push(name.clone());
            node = *prev;
        }
        names.reverse();
    }
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names
}
