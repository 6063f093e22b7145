use crate::eval::Evaluator;
use crate::graph::{EdgeId, ElementRef, NodeId, PropertyGraph};
use crate::prelude::Result;
use crate::result::{QueryResult, Table};
use crate::value::{Binding, Number, Value};
use seeql_cypher::{
    ElementKind, Expression, MatchClause, OrderItem, ReturnClause, ReturnItem, SortDirection,
};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Column(usize),
    Expression(&'a Expression),
}

struct Row {
    values: Vec<Value>,
    keys: Vec<Value>,
}

/// Turns accepted bindings into a [`QueryResult`].
pub struct Projector<'g, G> {
    graph: &'g G,
}

impl<'g, G: PropertyGraph> Projector<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Projector { graph }
    }

    pub fn project(
        &self,
        return_clause: &ReturnClause,
        match_clause: &MatchClause,
        bindings: Vec<Binding>,
    ) -> Result<QueryResult> {
        let items = effective_items(return_clause, match_clause);
        let columns: Vec<String> = items.iter().map(ReturnItem::column_name).collect();
        let order: &[OrderItem] = return_clause.order_by.as_deref().unwrap_or(&[]);
        let sort_keys: Vec<SortKey> = order.iter().map(|item| sort_key(item, &items)).collect();

        let evaluator = Evaluator::new(self.graph);
        let mut rows = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            let mut values = Vec::with_capacity(items.len());
            for item in items.iter() {
                values.push(evaluator.evaluate(&item.expression, binding)?);
            }
            let mut keys = Vec::with_capacity(sort_keys.len());
            for key in &sort_keys {
                keys.push(match key {
                    SortKey::Column(idx) => values[*idx].clone(),
                    SortKey::Expression(expr) => evaluator.evaluate(expr, binding)?,
                });
            }
            rows.push(Row { values, keys });
        }

        if return_clause.distinct {
            rows = distinct_rows(rows);
        }
        if !order.is_empty() {
            rows.sort_by(|a, b| compare_keys(&a.keys, &b.keys, order));
        }
        let rows = apply_skip_limit(rows, return_clause.skip, return_clause.limit);
        let rows: Vec<Vec<Value>> = rows.into_iter().map(|row| row.values).collect();

        Ok(classify(&items, columns, rows))
    }
}

/// `RETURN *` replaces any explicit items with every match variable in
/// declaration order.
fn effective_items<'a>(
    return_clause: &'a ReturnClause,
    match_clause: &MatchClause,
) -> Cow<'a, [ReturnItem]> {
    if !return_clause.anything {
        return Cow::Borrowed(&return_clause.items);
    }
    Cow::Owned(
        match_clause
            .variables()
            .iter()
            .map(|(name, kind)| ReturnItem::new(Expression::typed_variable(name, kind)))
            .collect(),
    )
}

fn sort_key<'a>(order: &'a OrderItem, items: &[ReturnItem]) -> SortKey<'a> {
    if let Some(idx) = items
        .iter()
        .position(|item| item.expression == order.expression)
    {
        return SortKey::Column(idx);
    }
    if let Expression::Variable { name, .. } = &order.expression {
        if let Some(idx) = items
            .iter()
            .position(|item| item.alias.as_deref() == Some(name.as_str()))
        {
            return SortKey::Column(idx);
        }
    }
    SortKey::Expression(&order.expression)
}

/// Keeps the first of each group of rows that are equal column by column
/// under [`Value::value_eq`].
fn distinct_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut output: Vec<Row> = Vec::new();
    for row in rows {
        let duplicate = output.iter().any(|kept| {
            kept.values.len() == row.values.len()
                && kept
                    .values
                    .iter()
                    .zip(&row.values)
                    .all(|(a, b)| a.value_eq(b))
        });
        if !duplicate {
            output.push(row);
        }
    }
    output
}

fn compare_keys(a: &[Value], b: &[Value], order: &[OrderItem]) -> Ordering {
    for (idx, (left, right)) in a.iter().zip(b.iter()).enumerate() {
        let ord = compare_values(left, right).unwrap_or(Ordering::Equal);
        if ord != Ordering::Equal {
            return match order.get(idx).map(|item| item.direction) {
                Some(SortDirection::Desc) => ord.reverse(),
                _ => ord,
            };
        }
    }
    Ordering::Equal
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64().partial_cmp(&b.as_f64()),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn apply_skip_limit(mut rows: Vec<Row>, skip: Option<i64>, limit: Option<i64>) -> Vec<Row> {
    if let Some(skip) = skip {
        let skip = row_count(skip);
        if skip < rows.len() {
            rows = rows.split_off(skip);
        } else {
            rows.clear();
        }
    }
    if let Some(limit) = limit {
        rows.truncate(row_count(limit));
    }
    rows
}

fn row_count(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

/// Static kind of every item, if all items are element variables.
fn element_kinds(items: &[ReturnItem]) -> Option<Vec<ElementKind>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match &item.expression {
            Expression::Variable { kind, .. } => *kind,
            _ => None,
        })
        .collect()
}

fn classify(items: &[ReturnItem], columns: Vec<String>, rows: Vec<Vec<Value>>) -> QueryResult {
    if let Some(kinds) = element_kinds(items) {
        let (nodes, edges) = collect_elements(&rows);
        let has_nodes = kinds.contains(&ElementKind::Node);
        let has_edges = kinds.contains(&ElementKind::Edge);
        return match (has_nodes, has_edges) {
            (true, false) => QueryResult::Nodes(nodes),
            (false, true) => QueryResult::Edges(edges),
            _ => QueryResult::Graph { nodes, edges },
        };
    }

    if columns.len() == 1 && rows.len() == 1 {
        if let Some(value) = rows.into_iter().next().and_then(|row| row.into_iter().next()) {
            return match value {
                Value::Number(Number::Integer(value)) => QueryResult::Integer(value),
                Value::Number(Number::Float(value)) => QueryResult::Double(value),
                other => QueryResult::Single(other),
            };
        }
        return QueryResult::Table(Table {
            columns,
            rows: Vec::new(),
        });
    }

    QueryResult::Table(Table { columns, rows })
}

/// Distinct elements in first-seen order, row by row and column by column.
fn collect_elements(rows: &[Vec<Value>]) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut seen = HashSet::new();
    for value in rows.iter().flatten() {
        if let Value::Element(element) = value {
            if !seen.insert(*element) {
                continue;
            }
            match element {
                ElementRef::Node(id) => nodes.push(*id),
                ElementRef::Edge(id) => edges.push(*id),
            }
        }
    }
    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Attribute, InMemoryGraph};
    use crate::matcher::Matcher;
    use seeql_cypher::parse_query;

    fn graph() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        for (id, loc) in [("A", Some(5_i64)), ("B", Some(15)), ("C", Some(25)), ("D", None)] {
            let node = graph.add_node(id, "File").unwrap();
            graph.set_attribute(node, "Name", id).unwrap();
            if let Some(loc) = loc {
                graph.set_attribute(node, "LOC", loc).unwrap();
            }
        }
        graph.add_edge("ab", "Call", "A", "B").unwrap();
        graph.add_edge("bc", "Call", "B", "C").unwrap();
        graph
    }

    fn run(graph: &InMemoryGraph, text: &str) -> QueryResult {
        let query = parse_query(text).unwrap();
        let bindings = Matcher::new(graph).find(&query.match_clause).unwrap();
        Projector::new(graph)
            .project(&query.return_clause, &query.match_clause, bindings)
            .unwrap()
    }

    fn ids(graph: &InMemoryGraph, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|id| graph.element_id((*id).into()).unwrap().to_string())
            .collect()
    }

    #[test]
    fn column_names_use_alias_or_expression_text() {
        let graph = graph();
        let result = run(&graph, "MATCH (n) RETURN n.Name AS name, n.LOC");
        let table = result.table().unwrap();
        assert_eq!(table.columns, vec!["name", "n.LOC"]);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.value(3, "n.LOC"), Some(&Value::Null));
    }

    #[test]
    fn order_by_desc_puts_nulls_last() {
        let graph = graph();
        let result = run(&graph, "MATCH (n) RETURN n.Name, n.LOC ORDER BY n.LOC DESC");
        let table = result.table().unwrap();
        let names: Vec<_> = table.rows.iter().map(|row| row[0].clone()).collect();
        assert_eq!(
            names,
            vec![Value::text("C"), Value::text("B"), Value::text("A"), Value::text("D")]
        );
    }

    #[test]
    fn order_by_asc_puts_nulls_first_and_is_stable() {
        let graph = graph();
        let result = run(&graph, "MATCH (n) RETURN n.Name AS name ORDER BY n.LOC");
        let table = result.table().unwrap();
        assert_eq!(table.rows[0], vec![Value::text("D")]);
        assert_eq!(table.rows[3], vec![Value::text("C")]);

        let result = run(&graph, "MATCH (n) RETURN n.Name AS name ORDER BY n:File");
        let table = result.table().unwrap();
        let names: Vec<_> = table.rows.iter().map(|row| row[0].clone()).collect();
        assert_eq!(
            names,
            vec![Value::text("A"), Value::text("B"), Value::text("C"), Value::text("D")]
        );
    }

    #[test]
    fn order_by_alias() {
        let graph = graph();
        let result = run(
            &graph,
            "MATCH (n) WHERE n.LOC > 0 RETURN n.Name AS name, n.LOC AS metric ORDER BY metric DESC",
        );
        let table = result.table().unwrap();
        assert_eq!(table.value(0, "name"), Some(&Value::text("C")));
    }

    #[test]
    fn skip_and_limit() {
        let graph = graph();
        let result = run(&graph, "MATCH (n) RETURN n.Name SKIP 1 LIMIT 2");
        let table = result.table().unwrap();
        assert_eq!(table.rows, vec![vec![Value::text("B")], vec![Value::text("C")]]);

        let result = run(&graph, "MATCH (n) RETURN n.Name, n.LOC LIMIT 0");
        assert!(result.table().unwrap().rows.is_empty());

        let result = run(&graph, "MATCH (n) RETURN n.Name, n.LOC SKIP -3");
        assert_eq!(result.table().unwrap().rows.len(), 4);

        let result = run(&graph, "MATCH (n) RETURN n.Name, n.LOC SKIP 10");
        assert!(result.table().unwrap().rows.is_empty());
    }

    #[test]
    fn distinct_removes_equal_rows() {
        let graph = graph();
        let result = run(&graph, "MATCH (a)-[r]->(b) RETURN DISTINCT a:File AS file");
        assert_eq!(result, QueryResult::Single(Value::Bool(true)));
    }

    #[test]
    fn single_cell_is_classified_by_value() {
        let graph = graph();
        let result = run(&graph, "MATCH (n {Name: 'B'}) RETURN n.LOC");
        assert_eq!(result, QueryResult::Integer(15));
        let result = run(&graph, "MATCH (n {Name: 'B'}) RETURN 2.5");
        assert_eq!(result, QueryResult::Double(2.5));
        let result = run(&graph, "MATCH (n {Name: 'B'}) RETURN n.Name");
        assert_eq!(result, QueryResult::Single(Value::text("B")));
        let result = run(&graph, "MATCH (n {Name: 'D'}) RETURN n.LOC");
        assert_eq!(result, QueryResult::Single(Value::Null));
    }

    #[test]
    fn empty_match_gives_empty_table() {
        let graph = graph();
        let result = run(&graph, "MATCH (n {Name: 'Z'}) RETURN n.LOC");
        assert_eq!(result.table().map(|table| table.rows.len()), Some(0));
    }

    #[test]
    fn node_variables_give_nodes() {
        let graph = graph();
        let result = run(&graph, "MATCH (a)-[r]->(b) RETURN a, b");
        assert_eq!(ids(&graph, result.nodes()), vec!["A", "B", "C"]);
        assert!(matches!(result, QueryResult::Nodes(_)));
    }

    #[test]
    fn edge_variables_give_edges() {
        let graph = graph();
        let result = run(&graph, "MATCH (a)-[r]->(b) RETURN r");
        assert_eq!(result.edges().len(), 2);
        assert!(matches!(result, QueryResult::Edges(_)));
    }

    #[test]
    fn mixed_element_variables_give_graph() {
        let graph = graph();
        let result = run(&graph, "MATCH (a)-[r]->(b) WHERE a.Name = 'A' RETURN a, r, b");
        match result {
            QueryResult::Graph { nodes, edges } => {
                assert_eq!(ids(&graph, &nodes), vec!["A", "B"]);
                assert_eq!(edges.len(), 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn return_star_projects_all_variables() {
        let graph = graph();
        let result = run(&graph, "MATCH (a)-[r]->(b) RETURN *");
        assert!(matches!(result, QueryResult::Graph { .. }));
        assert_eq!(result.nodes().len(), 3);
        assert_eq!(result.edges().len(), 2);
    }

    #[test]
    fn return_star_ignores_explicit_items() {
        let graph = graph();
        let result = run(&graph, "MATCH (n) WHERE n.LOC > 10 RETURN *, n.LOC");
        assert!(matches!(result, QueryResult::Nodes(_)));
        assert_eq!(ids(&graph, result.nodes()), vec!["B", "C"]);
    }

    #[test]
    fn distinct_uses_value_equality() {
        let mut graph = InMemoryGraph::new();
        for (id, x) in [
            ("A", Some(Attribute::Integer(1))),
            ("B", Some(Attribute::Float(1.0))),
            ("C", Some(Attribute::Float(f64::NAN))),
            ("D", None),
            ("E", Some(Attribute::Float(2.5))),
        ] {
            let node = graph.add_node(id, "File").unwrap();
            if let Some(x) = x {
                graph.set_attribute(node, "x", x).unwrap();
            }
        }
        let result = run(&graph, "MATCH (n) RETURN DISTINCT n.x");
        let rows = &result.table().unwrap().rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec![Value::integer(1)]);
        assert!(matches!(rows[1][0], Value::Number(Number::Float(v)) if v.is_nan()));
        assert_eq!(rows[2], vec![Value::Null]);
        assert_eq!(rows[3], vec![Value::float(2.5)]);
    }
}
