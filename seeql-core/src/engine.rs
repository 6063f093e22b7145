use crate::errors::ErrorKind;
use crate::graph::PropertyGraph;
use crate::matcher::Matcher;
use crate::prelude::Result;
use crate::projector::Projector;
use crate::result::QueryResult;
use seeql_cypher::{parse_query, validate_query, Query};
use std::time::Instant;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryStats {
    pub parse_ms: u128,
    pub validate_ms: u128,
    pub match_ms: u128,
    pub project_ms: u128,
    pub nodes_scanned: usize,
    pub edges_scanned: usize,
    pub bindings_considered: usize,
    pub bindings_accepted: usize,
    pub rows_final: usize,
}

/// Runs queries against one borrowed graph and keeps the statistics of the
/// last run.
pub struct QueryEngine<'g, G> {
    graph: &'g G,
    stats: QueryStats,
}

impl<'g, G: PropertyGraph> QueryEngine<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        QueryEngine {
            graph,
            stats: QueryStats::default(),
        }
    }

    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    pub fn execute(&mut self, query: &str) -> Result<QueryResult> {
        self.stats = QueryStats::default();
        let started = Instant::now();
        let result = self.parse_and_run(query);

        let elapsed_ms = started.elapsed().as_millis();
        tracing::info!("in_memory: execute_query ({elapsed_ms} ms): {}", query.trim());
        self.log_outcome(&result);
        result
    }

    pub fn execute_ast(&mut self, query: &Query) -> Result<QueryResult> {
        self.stats = QueryStats::default();
        let started = Instant::now();
        let result = self.run(query);

        let elapsed_ms = started.elapsed().as_millis();
        tracing::info!("in_memory: execute_query_ast ({elapsed_ms} ms)");
        self.log_outcome(&result);
        result
    }

    fn parse_and_run(&mut self, query: &str) -> Result<QueryResult> {
        if query.trim().is_empty() {
            return Err(ErrorKind::EmptyQuery.into());
        }
        let parse_start = Instant::now();
        let query_ast = parse_query(query)?;
        self.stats.parse_ms = parse_start.elapsed().as_millis();

        let validate_start = Instant::now();
        validate_query(&query_ast)?;
        self.stats.validate_ms = validate_start.elapsed().as_millis();

        self.run(&query_ast)
    }

    fn run(&mut self, query: &Query) -> Result<QueryResult> {
        let match_start = Instant::now();
        let mut matcher = Matcher::new(self.graph);
        let found = matcher.find(&query.match_clause);
        let counters = matcher.counters();
        self.stats.nodes_scanned = counters.nodes_scanned;
        self.stats.edges_scanned = counters.edges_scanned;
        self.stats.bindings_considered = counters.bindings_considered;
        self.stats.bindings_accepted = counters.bindings_accepted;
        self.stats.match_ms = match_start.elapsed().as_millis();
        let bindings = found?;

        let project_start = Instant::now();
        let result = Projector::new(self.graph).project(
            &query.return_clause,
            &query.match_clause,
            bindings,
        )?;
        self.stats.project_ms = project_start.elapsed().as_millis();
        self.stats.rows_final = result.len();
        Ok(result)
    }

    fn log_outcome(&self, result: &Result<QueryResult>) {
        match result {
            Ok(output) => tracing::debug!("in_memory: execute_query result kind={}", output.kind()),
            Err(err) => tracing::error!("in_memory: execute_query failed: {err}"),
        }
        let stats = &self.stats;
        tracing::info!(
            "in_memory: execute_query stats nodes_scanned={} edges_scanned={} bindings_considered={} bindings_accepted={} rows_final={}",
            stats.nodes_scanned,
            stats.edges_scanned,
            stats.bindings_considered,
            stats.bindings_accepted,
            stats.rows_final
        );
        tracing::info!(
            "in_memory: execute_query timings parse={}ms validate={}ms match={}ms project={}ms",
            stats.parse_ms,
            stats.validate_ms,
            stats.match_ms,
            stats.project_ms
        );
    }
}

/// Parses, validates and runs `query` against `graph`.
pub fn execute_query<G: PropertyGraph>(query: &str, graph: &G) -> Result<QueryResult> {
    QueryEngine::new(graph).execute(query)
}

/// Runs an already built query. Pattern conflicts were rejected when the
/// AST was constructed.
pub fn execute_query_ast<G: PropertyGraph>(query: &Query, graph: &G) -> Result<QueryResult> {
    QueryEngine::new(graph).execute_ast(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryGraph;

    fn graph() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        for (id, loc) in [("A", 5_i64), ("B", 15), ("C", 25)] {
            let node = graph.add_node(id, "File").unwrap();
            graph.set_attribute(node, "LOC", loc).unwrap();
        }
        graph
    }

    #[test]
    fn records_stats() {
        let graph = graph();
        let mut engine = QueryEngine::new(&graph);
        let result = engine
            .execute("MATCH (n) WHERE n.LOC > 10 RETURN n.LOC")
            .unwrap();
        assert_eq!(result.table().map(|table| table.rows.len()), Some(2));
        let stats = engine.stats();
        assert_eq!(stats.nodes_scanned, 3);
        assert_eq!(stats.bindings_considered, 3);
        assert_eq!(stats.bindings_accepted, 2);
        assert_eq!(stats.rows_final, 2);
    }

    #[test]
    fn blank_query_is_empty_query() {
        let graph = graph();
        let err = execute_query("   \n", &graph).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EmptyQuery));
    }

    #[test]
    fn stats_reset_between_runs() {
        let graph = graph();
        let mut engine = QueryEngine::new(&graph);
        engine.execute("MATCH (n) RETURN n").unwrap();
        assert!(engine.execute("MATCH (n) WHERE n.LOC + 1 > 2 RETURN n").is_err());
        assert_eq!(engine.stats().bindings_accepted, 0);
        assert_eq!(engine.stats().rows_final, 0);
    }
}
