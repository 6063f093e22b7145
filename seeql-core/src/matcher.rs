use crate::eval::Evaluator;
use crate::graph::{EdgeId, ElementRef, NodeId, PropertyGraph};
use crate::prelude::Result;
use crate::value::{Binding, Value};
use seeql_cypher::{Attributes, EdgeElement, MatchClause, NodeElement, Pattern, PatternElement};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MatchCounters {
    pub nodes_scanned: usize,
    pub edges_scanned: usize,
    pub bindings_considered: usize,
    pub bindings_accepted: usize,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Empty,
    Node(NodeId),
    /// `from`/`to` are the nodes assigned to the element's `from`/`to`
    /// positions, which for undirected elements may be the reverse of the
    /// graph edge's direction.
    Edge {
        edge: EdgeId,
        from: NodeId,
        to: NodeId,
    },
}

struct SearchState {
    binding: Binding,
    slots: Vec<Vec<Slot>>,
    used_edges: Vec<EdgeId>,
}

/// Backtracking matcher over the patterns of one MATCH clause.
///
/// Elements are assigned depth-first, patterns in declaration order and
/// elements left to right, so bindings come out ordered by graph
/// enumeration order. One graph edge is never assigned to two edge
/// elements of the same binding.
pub struct Matcher<'g, G> {
    graph: &'g G,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    counters: MatchCounters,
}

impl<'g, G: PropertyGraph> Matcher<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Matcher {
            graph,
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
            counters: MatchCounters::default(),
        }
    }

    pub fn counters(&self) -> MatchCounters {
        self.counters
    }

    /// Returns every binding that satisfies the patterns and the WHERE
    /// filter. The first evaluation error aborts the search.
    pub fn find(&mut self, clause: &MatchClause) -> Result<Vec<Binding>> {
        let steps: Vec<(usize, usize)> = clause
            .patterns()
            .iter()
            .enumerate()
            .flat_map(|(p, pattern)| (0..pattern.elements().len()).map(move |i| (p, i)))
            .collect();
        let mut state = SearchState {
            binding: Binding::new(),
            slots: clause
                .patterns()
                .iter()
                .map(|pattern| vec![Slot::Empty; pattern.elements().len()])
                .collect(),
            used_edges: Vec::new(),
        };
        let mut out = Vec::new();
        self.search(clause, &steps, 0, &mut state, &mut out)?;
        Ok(out)
    }

    fn search(
        &mut self,
        clause: &MatchClause,
        steps: &[(usize, usize)],
        pos: usize,
        state: &mut SearchState,
        out: &mut Vec<Binding>,
    ) -> Result<()> {
        let Some(&(p, i)) = steps.get(pos) else {
            return self.accept(clause, state, out);
        };
        let pattern = &clause.patterns()[p];
        match &pattern.elements()[i] {
            PatternElement::Node(node) => {
                for candidate in self.node_candidates(pattern, p, i, node, state)? {
                    let bound = self.assign(&node.attributes, ElementRef::Node(candidate), state);
                    state.slots[p][i] = Slot::Node(candidate);
                    let result = self.search(clause, steps, pos + 1, state, out);
                    state.slots[p][i] = Slot::Empty;
                    self.release(&node.attributes, bound, state);
                    result?;
                }
            }
            PatternElement::Edge(edge) => {
                for (candidate, from, to) in self.edge_candidates(pattern, p, edge, state)? {
                    let bound = self.assign(&edge.attributes, ElementRef::Edge(candidate), state);
                    state.slots[p][i] = Slot::Edge {
                        edge: candidate,
                        from,
                        to,
                    };
                    state.used_edges.push(candidate);
                    let result = self.search(clause, steps, pos + 1, state, out);
                    state.used_edges.pop();
                    state.slots[p][i] = Slot::Empty;
                    self.release(&edge.attributes, bound, state);
                    result?;
                }
            }
        }
        Ok(())
    }

    fn accept(
        &mut self,
        clause: &MatchClause,
        state: &SearchState,
        out: &mut Vec<Binding>,
    ) -> Result<()> {
        self.counters.bindings_considered += 1;
        let keep = match clause.where_clause() {
            Some(filter) => Evaluator::new(self.graph).evaluate_predicate(filter, &state.binding)?,
            None => true,
        };
        if keep {
            self.counters.bindings_accepted += 1;
            out.push(state.binding.clone());
        }
        Ok(())
    }

    fn assign(&self, attributes: &Attributes, element: ElementRef, state: &mut SearchState) -> bool {
        match &attributes.variable {
            Some(name) => state.binding.bind(name, element),
            None => false,
        }
    }

    fn release(&self, attributes: &Attributes, bound: bool, state: &mut SearchState) {
        if let (true, Some(name)) = (bound, &attributes.variable) {
            state.binding.unbind(name);
        }
    }

    fn node_candidates(
        &mut self,
        pattern: &Pattern,
        p: usize,
        i: usize,
        node: &NodeElement,
        state: &SearchState,
    ) -> Result<Vec<NodeId>> {
        let pool = match bound_node(&node.attributes, &state.binding) {
            Some(id) => vec![id],
            None => match pinned_endpoint(pattern, &state.slots[p], i) {
                Some(id) => vec![id],
                None => self.nodes.clone(),
            },
        };

        let mut candidates = Vec::new();
        for id in pool {
            self.counters.nodes_scanned += 1;
            if !incident_edges_agree(pattern, &state.slots[p], i, id) {
                continue;
            }
            if self.element_fits(ElementRef::Node(id), &node.attributes, &state.binding)? {
                candidates.push(id);
            }
        }
        Ok(candidates)
    }

    fn edge_candidates(
        &mut self,
        pattern: &Pattern,
        p: usize,
        edge: &EdgeElement,
        state: &SearchState,
    ) -> Result<Vec<(EdgeId, NodeId, NodeId)>> {
        let bound = match &edge.attributes.variable {
            Some(name) => match state.binding.get(name) {
                Some(ElementRef::Edge(id)) => Some(id),
                _ => None,
            },
            None => None,
        };
        let pool = match bound {
            Some(id) => vec![id],
            None => self.edges.clone(),
        };
        let from_required = endpoint_constraint(pattern, &state.slots[p], &state.binding, edge.from);
        let to_required = endpoint_constraint(pattern, &state.slots[p], &state.binding, edge.to);

        let mut candidates = Vec::new();
        for id in pool {
            self.counters.edges_scanned += 1;
            if bound.is_none() && state.used_edges.contains(&id) {
                continue;
            }
            let (Some(source), Some(target)) = (self.graph.source(id), self.graph.target(id))
            else {
                continue;
            };
            let mut orientations = vec![(source, target)];
            if edge.undirected && source != target {
                orientations.push((target, source));
            }
            let orientations: Vec<_> = orientations
                .into_iter()
                .filter(|(from, to)| {
                    from_required.is_none_or(|required| required == *from)
                        && to_required.is_none_or(|required| required == *to)
                })
                .collect();
            if orientations.is_empty() {
                continue;
            }
            if !self.element_fits(ElementRef::Edge(id), &edge.attributes, &state.binding)? {
                continue;
            }
            for (from, to) in orientations {
                candidates.push((id, from, to));
            }
        }
        Ok(candidates)
    }

    /// Label and literal property pre-filter.
    fn element_fits(
        &self,
        element: ElementRef,
        attributes: &Attributes,
        binding: &Binding,
    ) -> Result<bool> {
        if let Some(label) = &attributes.label {
            if self.graph.element_type(element) != Some(label.as_str()) {
                return Ok(false);
            }
        }
        let evaluator = Evaluator::new(self.graph);
        for (key, expected) in &attributes.properties {
            let expected = evaluator.evaluate(expected, binding)?;
            let actual = match self.graph.numeric_attribute(element, key) {
                Some(number) => Value::Number(number),
                None => match self.graph.string_attribute(element, key) {
                    Some(text) => Value::text(text),
                    None => return Ok(false),
                },
            };
            if !actual.value_eq(&expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn bound_node(attributes: &Attributes, binding: &Binding) -> Option<NodeId> {
    match binding.get(attributes.variable.as_deref()?) {
        Some(ElementRef::Node(id)) => Some(id),
        _ => None,
    }
}

/// Node fixed by an already assigned edge element of the same pattern.
fn pinned_endpoint(pattern: &Pattern, slots: &[Slot], index: usize) -> Option<NodeId> {
    pattern
        .elements()
        .iter()
        .zip(slots)
        .find_map(|(element, slot)| match (element, slot) {
            (PatternElement::Edge(edge), Slot::Edge { from, to, .. }) => {
                if edge.from == index {
                    Some(*from)
                } else if edge.to == index {
                    Some(*to)
                } else {
                    None
                }
            }
            _ => None,
        })
}

fn incident_edges_agree(pattern: &Pattern, slots: &[Slot], index: usize, node: NodeId) -> bool {
    pattern
        .elements()
        .iter()
        .zip(slots)
        .all(|(element, slot)| match (element, slot) {
            (PatternElement::Edge(edge), Slot::Edge { from, to, .. }) => {
                (edge.from != index || *from == node) && (edge.to != index || *to == node)
            }
            _ => true,
        })
}

/// Node an edge endpoint must land on, if already decided.
fn endpoint_constraint(
    pattern: &Pattern,
    slots: &[Slot],
    binding: &Binding,
    index: usize,
) -> Option<NodeId> {
    match slots.get(index) {
        Some(Slot::Node(id)) => Some(*id),
        _ => match pattern.elements().get(index) {
            Some(PatternElement::Node(node)) => bound_node(&node.attributes, binding),
            _ => None,
        },
    }
}
