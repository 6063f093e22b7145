use seeql_core::eval::Evaluator;
use seeql_core::{
    execute_query, execute_query_ast, Binding, ElementRef, ErrorKind, InMemoryGraph, NodeId,
    PropertyGraph, QueryResult, Value,
};
use seeql_cypher::{
    parse_query, Attributes, ElementKind, Expression, MatchClause, NodeElement, Pattern,
    RelationshipElement,
};

fn metric_graph(locs: &[(&str, Option<i64>)]) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    for (id, loc) in locs {
        let node = graph.add_node(id, "File").unwrap();
        graph.set_attribute(node, "Name", *id).unwrap();
        if let Some(loc) = loc {
            graph.set_attribute(node, "LOC", *loc).unwrap();
        }
    }
    graph
}

#[test]
fn end_to_end_max_metric() {
    let graph = metric_graph(&[("A", Some(5)), ("B", Some(15)), ("C", Some(25))]);
    let result = execute_query(
        "MATCH (n) WHERE n.LOC IS NOT NULL AND n.LOC > 10 RETURN n.LOC ORDER BY n.LOC DESC LIMIT 1",
        &graph,
    )
    .unwrap();
    assert_eq!(result, QueryResult::Integer(25));
}

#[test]
fn unconstrained_node_pattern_yields_every_node() {
    for k in [0, 1, 4] {
        let ids: Vec<String> = (0..k).map(|i| format!("N{i}")).collect();
        let locs: Vec<(&str, Option<i64>)> = ids.iter().map(|id| (id.as_str(), None)).collect();
        let graph = metric_graph(&locs);
        let result = execute_query("MATCH (n) RETURN n.Name, n.LOC", &graph).unwrap();
        let rows = match &result {
            QueryResult::Table(table) => table.rows.len(),
            QueryResult::Single(_) => 1,
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!(rows, k);
    }
}

#[test]
fn where_on_metric_excludes_nodes_without_it() {
    let graph = metric_graph(&[
        ("A", Some(5)),
        ("B", Some(15)),
        ("C", None),
        ("D", Some(11)),
        ("E", Some(10)),
    ]);
    let result = execute_query("MATCH (n) WHERE n.LOC > 10 RETURN n", &graph).unwrap();
    let names: Vec<_> = result
        .nodes()
        .iter()
        .map(|id| graph.element_id((*id).into()).unwrap())
        .collect();
    assert_eq!(names, vec!["B", "D"]);
}

#[test]
fn order_desc_limit_one_takes_first_maximum() {
    let graph = metric_graph(&[("A", Some(7)), ("B", Some(9)), ("C", Some(9)), ("D", None)]);
    let result = execute_query(
        "MATCH (n) RETURN n.Name AS name, n.LOC AS metric ORDER BY metric DESC LIMIT 1",
        &graph,
    )
    .unwrap();
    let table = result.table().unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.value(0, "metric"), Some(&Value::integer(9)));
    assert_eq!(table.value(0, "name"), Some(&Value::text("B")));
}

#[test]
fn classification_by_projected_kinds() {
    let mut graph = metric_graph(&[("A", Some(1)), ("B", Some(2))]);
    graph.add_edge("ab", "Call", "A", "B").unwrap();

    let result = execute_query("MATCH (n) RETURN n", &graph).unwrap();
    assert!(matches!(result, QueryResult::Nodes(ref nodes) if nodes.len() == 2));

    let result = execute_query("MATCH (a)-[r]->(b) RETURN a, r", &graph).unwrap();
    match result {
        QueryResult::Graph { nodes, edges } => {
            assert_eq!(nodes.len(), 1);
            assert_eq!(edges.len(), 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let result = execute_query("MATCH (a)-[r]->(b) RETURN r", &graph).unwrap();
    assert_eq!(result.edges(), &[graph.edge_by_id("ab").unwrap()]);

    let result = execute_query("MATCH (n {Name: 'A'}) RETURN 3", &graph).unwrap();
    assert_eq!(result, QueryResult::Integer(3));
    let result = execute_query("MATCH (n {Name: 'A'}) RETURN 3.0", &graph).unwrap();
    assert_eq!(result, QueryResult::Double(3.0));
}

#[test]
fn literal_expressions_evaluate_deterministically() {
    let graph = metric_graph(&[("A", Some(1))]);
    let expr = Expression::Or {
        left: Box::new(Expression::Not {
            operand: Box::new(Expression::BooleanLiteral("false".to_string())),
        }),
        right: Box::new(Expression::Greater {
            left: Box::new(Expression::number("2.5")),
            right: Box::new(Expression::Negate {
                operand: Box::new(Expression::number("3")),
            }),
        }),
    };
    let evaluator = Evaluator::new(&graph);
    let binding = Binding::new();
    let first = evaluator.evaluate(&expr, &binding).unwrap();
    let second = evaluator.evaluate(&expr, &binding).unwrap();
    assert_eq!(first, Value::Bool(true));
    assert_eq!(first, second);
}

#[test]
fn is_null_and_is_not_null_agree_on_the_same_operand() {
    let graph = metric_graph(&[("A", Some(1)), ("B", None)]);
    let evaluator = Evaluator::new(&graph);
    for node in graph.nodes() {
        let binding: Binding = [("n", ElementRef::Node(node))].into_iter().collect();
        let operand = Expression::property(Expression::typed_variable("n", ElementKind::Node), "LOC");
        let is_null = Expression::IsNull {
            operand: Box::new(operand.clone()),
        };
        let is_not_null = Expression::IsNotNull {
            operand: Box::new(operand),
        };
        assert_eq!(
            evaluator.evaluate(&is_null, &binding).unwrap(),
            evaluator.evaluate(&is_not_null, &binding).unwrap()
        );
    }
}

#[test]
fn node_edge_variable_conflict_fails_in_any_order() {
    let graph = metric_graph(&[("A", Some(1))]);
    for query in [
        "MATCH (n)-[n]->(m) RETURN m",
        "MATCH (m)-[n]->(n) RETURN m",
        "MATCH (n), (a)-[n]->(b) RETURN a",
        "MATCH (a)-[n]->(b), (n) RETURN a",
    ] {
        let err = execute_query(query, &graph).unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::PatternConflict { variable, .. } if variable == "n"),
            "{query}: {err}"
        );
    }

    let node = Pattern::node(NodeElement::new(Attributes::named("n"))).unwrap();
    let edge = Pattern::chain(
        NodeElement::new(Attributes::named("a")),
        vec![(
            RelationshipElement::new(Attributes::named("n"), false, true),
            NodeElement::new(Attributes::named("b")),
        )],
    )
    .unwrap();
    assert!(MatchClause::new(vec![node.clone(), edge.clone()], None).is_err());
    assert!(MatchClause::new(vec![edge, node], None).is_err());
}

#[test]
fn evaluation_errors_abort_the_query() {
    let graph = metric_graph(&[("A", Some(1)), ("B", Some(2))]);
    let err = execute_query("MATCH (n) WHERE n.LOC * 2 > 1 RETURN n", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnsupportedOperator(op) if op == "*"));

    let err = execute_query("MATCH (n) WHERE n.Name < 3 RETURN n", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch(_)));

    let err = execute_query("MATCH (n) RETURN n.LOC:File", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch(_)));
}

#[test]
fn empty_and_invalid_queries() {
    let graph = metric_graph(&[]);
    let err = execute_query("", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::EmptyQuery));

    let err = execute_query("MATCH (n) WITH n RETURN n", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Cypher(_)));

    let err = execute_query("MATCH (n) WHERE count(*) > 1 RETURN n", &graph).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Cypher(_)));
}

#[test]
fn no_match_is_an_ordinary_result() {
    let graph = metric_graph(&[("A", Some(1))]);
    let result = execute_query("MATCH (n:Class) RETURN n", &graph).unwrap();
    assert_eq!(result, QueryResult::Nodes(Vec::new()));
    let result = execute_query("MATCH (n) WHERE n.LOC > 5 RETURN n.LOC", &graph).unwrap();
    assert!(result.table().unwrap().rows.is_empty());
}

#[test]
fn executes_prebuilt_ast() {
    let graph = metric_graph(&[("A", Some(5)), ("B", Some(15))]);
    let query = parse_query("MATCH (n) WHERE n.LOC >= 15 RETURN n").unwrap();
    let result = execute_query_ast(&query, &graph).unwrap();
    assert_eq!(result.nodes(), &[NodeId(1)]);
}

#[test]
fn relationship_queries_over_loaded_document() {
    let graph = InMemoryGraph::from_json_str(
        r#"{
            "nodes": [
                {"id": "main.c", "type": "File", "attributes": {"LOC": 120}},
                {"id": "util.c", "type": "File", "attributes": {"LOC": 40}},
                {"id": "Parser", "type": "Class", "attributes": {"LOC": 300}}
            ],
            "edges": [
                {"id": "d1", "type": "Source_Dependency", "source": "main.c", "target": "util.c"},
                {"id": "d2", "type": "Source_Dependency", "source": "main.c", "target": "Parser", "attributes": {"Weight": 2}}
            ]
        }"#,
    )
    .unwrap();

    let result = execute_query(
        "MATCH (a:File)-[d:Source_Dependency]->(b) WHERE b.LOC > 100 RETURN b.LOC",
        &graph,
    )
    .unwrap();
    assert_eq!(result, QueryResult::Integer(300));

    let result = execute_query("MATCH (a)-[d {Weight: 2}]-(b) RETURN DISTINCT d", &graph).unwrap();
    assert_eq!(result.edges(), &[graph.edge_by_id("d2").unwrap()]);

    let result = execute_query(
        "MATCH (a)<-[d]-(b) RETURN a.LOC AS loc ORDER BY loc SKIP 1",
        &graph,
    )
    .unwrap();
    assert_eq!(result, QueryResult::Integer(300));
}

#[test]
fn equality_spellings_select_the_same_nodes() {
    let graph = metric_graph(&[("A", Some(5)), ("B", Some(15)), ("C", None), ("D", Some(5))]);
    let select = |text: &str| -> Vec<String> {
        execute_query(text, &graph)
            .unwrap()
            .nodes()
            .iter()
            .map(|id| graph.element_id((*id).into()).unwrap().to_string())
            .collect()
    };

    let equal = select("MATCH (n) WHERE n.LOC = 5 RETURN n");
    assert_eq!(equal, vec!["A", "D"]);
    assert_eq!(select("MATCH (n) WHERE n.LOC == 5 RETURN n"), equal);

    let not_equal = select("MATCH (n) WHERE n.LOC <> 5 RETURN n");
    assert!(not_equal.contains(&"B".to_string()));
    assert!(!not_equal.contains(&"A".to_string()));
    assert_eq!(select("MATCH (n) WHERE n.LOC != 5 RETURN n"), not_equal);
}
