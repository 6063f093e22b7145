use seeql_cypher::{parse_query, validate_query};

#[test]
fn parser_accepts_corpus() {
    let queries = build_valid_queries();
    for (idx, query) in queries.iter().enumerate() {
        match parse_query(query) {
            Ok(ast) => {
                if let Err(err) = validate_query(&ast) {
                    panic!("valid query {idx} failed validation: {query}\n{err}");
                }
            }
            Err(err) => panic!("valid query {idx} failed: {query}\n{err}"),
        }
    }
}

#[test]
fn parser_rejects_corpus() {
    let queries = build_invalid_queries();
    for (idx, query) in queries.iter().enumerate() {
        if parse_query(query).is_ok() {
            panic!("invalid query {idx} unexpectedly parsed: {query}");
        }
    }
}

fn build_valid_queries() -> Vec<String> {
    let mut queries = Vec::new();

    let node_patterns = [
        "(n)",
        "(n:File)",
        "(n:Class)",
        "(n {Name: 'main.c'})",
        "(n:File {LOC: 10})",
    ];
    let node_wheres = [
        "",
        "WHERE n.Name = 'main.c'",
        "WHERE n.Name <> 'main.c'",
        "WHERE n.LOC >= 1",
        "WHERE n.LOC < 2.5",
        "WHERE n.Flag = true",
        "WHERE n.LOC IS NULL",
        "WHERE n.LOC IS NOT NULL AND n.LOC > 10",
        "WHERE NOT (n.Flag = false)",
        "WHERE n:File XOR n:Class",
        "WHERE -n.LOC <= -3",
    ];
    let node_returns = [
        "RETURN n",
        "RETURN n.Name AS name",
        "RETURN n.LOC",
        "RETURN count(*) AS total",
        "RETURN DISTINCT n.Name AS name",
        "RETURN n.LOC AS metric ORDER BY metric DESC SKIP 1 LIMIT 3",
        "RETURN *",
    ];

    for pattern in node_patterns {
        for where_clause in node_wheres {
            for ret in node_returns {
                push_query(
                    &mut queries,
                    &[&format!("MATCH {pattern}"), where_clause, ret],
                );
            }
        }
    }

    let rel_patterns = [
        "(a)-[r:Call]->(b)",
        "(a)<-[r:Call]-(b)",
        "(a)-[r]->(b)",
        "(a)-[r:Call]-(b)",
        "(a:File)-[r:Source_Dependency]->(b:File)",
        "(a)-[r {Weight: 2}]->(b)",
        "(a)-[r]->(b)-[s]->(c)",
    ];
    let rel_wheres = [
        "",
        "WHERE a.Name = 'main.c'",
        "WHERE r IS NOT NULL",
        "WHERE a:File AND b:File",
        "WHERE NOT (r.Weight = 1)",
    ];
    let rel_returns = [
        "RETURN a, b",
        "RETURN a, b, r",
        "RETURN r",
        "RETURN a.Name AS an ORDER BY an",
    ];

    for pattern in rel_patterns {
        for where_clause in rel_wheres {
            for ret in rel_returns {
                push_query(
                    &mut queries,
                    &[&format!("MATCH {pattern}"), where_clause, ret],
                );
            }
        }
    }

    let extras = [
        "MATCH (a), (b) RETURN a, b",
        "MATCH (a:File), (a)-[r]->(b) RETURN b",
        "MATCH (n)\nRETURN n",
        "MATCH (n)\nWHERE n.Name = 'main.c'\nRETURN n.Name AS name",
        "match (n) where n.LOC > 1 return n order by n.LOC desc limit 1",
    ];
    for query in extras {
        queries.push(query.to_string());
    }

    queries
}

fn build_invalid_queries() -> Vec<&'static str> {
    vec![
        "OPTIONAL MATCH (n) RETURN n",
        "MATCH p = (a)--(b) RETURN p",
        "MATCH (a)-[:Call*1..3]->(b) RETURN a",
        "MATCH (a)-[:Call|Use]->(b) RETURN a",
        "MATCH (n:File:Class) RETURN n",
        "MATCH (n) WITH n RETURN n",
        "UNWIND [1,2,3] AS x RETURN x",
        "MATCH (a) MATCH (b) RETURN a",
        "CREATE (n) RETURN n",
        "MATCH (n) SET n.LOC = 1 RETURN n",
        "MATCH (n) DELETE n",
        "MATCH (n) RETURN n LIMIT $max",
        "MATCH (n) RETURN n ORDER BY",
        "MATCH (n) RETURN",
        "RETURN",
        "RETURN 1",
        "MATCH (n)",
        "MATCH (n",
        "MATCH n RETURN n",
        "MATCH (n) WHERE RETURN n",
        "MATCH (n) LIMIT 5 RETURN n",
        "MATCH (n) RETURN n SKIP",
        "MATCH (n) RETURN n LIMIT",
        "MATCH (n)-[n]->(m) RETURN m",
    ]
}

fn push_query(out: &mut Vec<String>, parts: &[&str]) {
    let mut query = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if !query.is_empty() {
            query.push(' ');
        }
        query.push_str(part);
    }
    out.push(query);
}
