use crate::ast::*;
use crate::pattern::*;
use crate::CypherError;
use std::borrow::Cow;
use tree_sitter::{Node, Tree};

pub fn parse_query(input: &str) -> Result<Query, CypherError> {
    let input = normalize_comparisons(input);
    let tree = crate::parse_cypher(&input)?;
    build_query(&input, &tree)
}

/// Rewrites `!=` to `<>` and `==` to `= ` outside quoted text, so both
/// spellings reach the grammar's comparison rule. Byte offsets are kept.
fn normalize_comparisons(input: &str) -> Cow<'_, str> {
    if !input.contains("!=") && !input.contains("==") {
        return Cow::Borrowed(input);
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut quote = None;
    let mut idx = 0;
    while idx < bytes.len() {
        let byte = bytes[idx];
        match quote {
            Some(q) => {
                out.push(byte);
                if byte == b'\\' && q != b'`' {
                    if let Some(&escaped) = bytes.get(idx + 1) {
                        out.push(escaped);
                        idx += 1;
                    }
                } else if byte == q {
                    quote = None;
                }
            }
            None => match (byte, bytes.get(idx + 1)) {
                (b'\'' | b'"' | b'`', _) => {
                    quote = Some(byte);
                    out.push(byte);
                }
                (b'!', Some(b'=')) => {
                    out.extend_from_slice(b"<>");
                    idx += 1;
                }
                (b'=', Some(b'=')) => {
                    out.extend_from_slice(b"= ");
                    idx += 1;
                }
                _ => out.push(byte),
            },
        }
        idx += 1;
    }
    String::from_utf8(out).map_or(Cow::Borrowed(input), Cow::Owned)
}

fn build_query(input: &str, tree: &Tree) -> Result<Query, CypherError> {
    let root = tree.root_node();
    let mut clause_nodes = clause_nodes(root);
    clause_nodes.sort_by_key(|node| node.start_byte());

    if clause_nodes.is_empty() {
        return Err(CypherError::EmptyQuery);
    }

    let mut match_clause = None;
    let mut return_clause = None;
    for node in clause_nodes {
        let span = Span::from_node(node);
        match node.kind() {
            "match" => {
                if match_clause.is_some() {
                    return Err(CypherError::unsupported("multiple MATCH clauses", span));
                }
                if return_clause.is_some() {
                    return Err(CypherError::semantic("MATCH after RETURN", span));
                }
                match_clause = Some(parse_match(node, input)?);
            }
            "return" => {
                if return_clause.is_some() {
                    return Err(CypherError::unsupported("multiple RETURN clauses", span));
                }
                return_clause = Some(parse_return(node, input)?);
            }
            other => {
                return Err(CypherError::unsupported(
                    format!("{} clause", other.to_ascii_uppercase()),
                    span,
                ));
            }
        }
    }

    let root_span = Span::from_node(root);
    let match_clause = match_clause
        .ok_or_else(|| CypherError::semantic("query must start with MATCH", root_span))?;
    let return_clause = return_clause
        .ok_or_else(|| CypherError::semantic("query must end with RETURN", root_span))?;
    Ok(Query::new(match_clause, return_clause))
}

/// Top-level clause kinds; all but MATCH and RETURN are rejected by name.
const CLAUSE_KINDS: &[&str] = &[
    "match",
    "return",
    "with",
    "unwind",
    "create",
    "merge",
    "set",
    "delete",
    "remove",
    "in_query_call",
    "standalone_call",
];

/// Subtrees whose nested clauses (e.g. inside an EXISTS subquery) are not
/// top-level clauses.
const NESTED_SCOPES: &[&str] = &[
    "expression",
    "case_expression",
    "existential_subquery",
    "function_invocation",
    "list_comprehension",
    "pattern_comprehension",
    "quantifier",
];

fn clause_nodes<'a>(root: Node<'a>) -> Vec<Node<'a>> {
    let mut found = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        let kind = node.kind();
        if kind.ends_with("_expression") || NESTED_SCOPES.contains(&kind) {
            continue;
        }
        if CLAUSE_KINDS.contains(&kind) {
            found.push(node);
        } else {
            pending.extend(named_children(node));
        }
    }
    found
}

fn parse_match(node: Node, input: &str) -> Result<MatchClause, CypherError> {
    let span = Span::from_node(node);
    let text = source_text(node, input)?;
    if text
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("optional")
    {
        return Err(CypherError::unsupported("OPTIONAL MATCH", span));
    }

    let pattern = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "pattern")
        .ok_or_else(|| CypherError::missing("match pattern", span))?;
    let where_clause = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "where")
        .map(|where_node| parse_where(where_node, input))
        .transpose()?;

    let mut clause = MatchClause::new(parse_pattern(pattern, input)?, where_clause)?;
    clause.span = span;
    Ok(clause)
}

fn parse_return(node: Node, input: &str) -> Result<ReturnClause, CypherError> {
    let projection = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "projection_body")
        .ok_or_else(|| CypherError::missing("return projection", Span::from_node(node)))?;
    let mut clause = parse_projection_body(projection, input)?;
    clause.span = Span::from_node(node);
    Ok(clause)
}

fn parse_projection_body(node: Node, input: &str) -> Result<ReturnClause, CypherError> {
    let mut clause = ReturnClause::default();

    let projection_items = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "projection_items")
        .ok_or_else(|| CypherError::missing("projection items", Span::from_node(node)))?;

    let items_text = source_text(projection_items, input)?.trim();
    clause.anything = items_text.starts_with('*');

    for child in named_children(projection_items) {
        if child.kind() == "projection_item" {
            clause.items.push(parse_projection_item(child, input)?);
        }
    }

    for child in named_children(node) {
        match child.kind() {
            "order" => clause.order_by = Some(parse_order(child, input)?),
            "skip" => clause.skip = Some(parse_row_count(child, input, "skip")?),
            "limit" => clause.limit = Some(parse_row_count(child, input, "limit")?),
            _ => {}
        }
    }

    let text = source_text(node, input)?.to_ascii_lowercase();
    clause.distinct = text.trim_start().starts_with("distinct");

    Ok(clause)
}

/// SKIP/LIMIT take a (possibly negated) integer literal.
fn parse_row_count(node: Node, input: &str, what: &str) -> Result<i64, CypherError> {
    let span = Span::from_node(node);
    let expr_node = named_children(node)
        .into_iter()
        .find(|c| c.kind() == "expression")
        .ok_or_else(|| CypherError::missing(format!("{what} expression"), span))?;
    match parse_expression(expr_node, input)? {
        Expression::NumericLiteral(text) => integer_literal(&text),
        Expression::Negate { operand } => match *operand {
            Expression::NumericLiteral(text) => integer_literal(&text).map(|v| -v),
            _ => Err(CypherError::unsupported(format!("non-literal {what}"), span)),
        },
        _ => Err(CypherError::unsupported(format!("non-literal {what}"), span)),
    }
}

fn integer_literal(text: &str) -> Result<i64, CypherError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| CypherError::invalid_literal("integer literal", text.to_string()))
}

fn parse_projection_item(node: Node, input: &str) -> Result<ReturnItem, CypherError> {
    let mut named = named_children(node).into_iter();
    let expr_node = named
        .next()
        .ok_or_else(|| CypherError::missing("projection expression", Span::from_node(node)))?;
    let expression = parse_expression(expr_node, input)?;

    let alias = named
        .find(|child| child.kind() == "variable")
        .map(|var| parse_identifier(var, input))
        .transpose()?;

    Ok(ReturnItem { alias, expression })
}

fn parse_order(node: Node, input: &str) -> Result<Vec<OrderItem>, CypherError> {
    let mut items = Vec::new();
    for child in named_children(node) {
        if child.kind() == "sort_item" {
            items.push(parse_sort_item(child, input)?);
        }
    }
    Ok(items)
}

fn parse_sort_item(node: Node, input: &str) -> Result<OrderItem, CypherError> {
    let expr_node = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "expression")
        .ok_or_else(|| CypherError::missing("sort expression", Span::from_node(node)))?;
    let expression = parse_expression(expr_node, input)?;
    let suffix = input
        .get(expr_node.end_byte()..node.end_byte())
        .ok_or_else(|| CypherError::invalid_text(Span::from_node(node)))?
        .trim()
        .to_ascii_lowercase();
    let direction = if suffix.starts_with("desc") {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    Ok(OrderItem {
        expression,
        direction,
    })
}

fn parse_where(node: Node, input: &str) -> Result<Expression, CypherError> {
    let expr_node = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "expression")
        .ok_or_else(|| CypherError::missing("where expression", Span::from_node(node)))?;
    parse_expression(expr_node, input)
}

fn parse_pattern(node: Node, input: &str) -> Result<Vec<Pattern>, CypherError> {
    let parts: Vec<Node> = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "pattern_part")
        .collect();
    if parts.is_empty() {
        return Err(CypherError::missing("pattern part", Span::from_node(node)));
    }
    parts
        .into_iter()
        .map(|part| parse_pattern_part(part, input))
        .collect()
}

fn parse_pattern_part(node: Node, input: &str) -> Result<Pattern, CypherError> {
    let mut named = named_children(node).into_iter();
    let first = named
        .next()
        .ok_or_else(|| CypherError::missing("pattern element", Span::from_node(node)))?;

    if first.kind() == "variable" {
        return Err(CypherError::unsupported(
            "named pattern assignment",
            Span::from_node(node),
        ));
    }

    parse_pattern_element(first, input)
}

fn parse_pattern_element(node: Node, input: &str) -> Result<Pattern, CypherError> {
    let element = if node.kind() == "pattern_element" {
        node
    } else {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == "pattern_element")
            .unwrap_or(node)
    };

    let node_pattern = named_children(element)
        .into_iter()
        .find(|child| child.kind() == "node_pattern")
        .ok_or_else(|| CypherError::missing("node pattern", Span::from_node(element)))?;
    let start = parse_node_pattern(node_pattern, input)?;

    let mut segments = Vec::new();
    for chain in named_children(element)
        .into_iter()
        .filter(|child| child.kind() == "pattern_element_chain")
    {
        let rel = named_children(chain)
            .into_iter()
            .find(|child| child.kind() == "relationship_pattern")
            .ok_or_else(|| CypherError::missing("relationship pattern", Span::from_node(chain)))?;
        let right = named_children(chain)
            .into_iter()
            .find(|child| child.kind() == "node_pattern")
            .ok_or_else(|| CypherError::missing("node pattern", Span::from_node(chain)))?;

        segments.push((
            parse_relationship_pattern(rel, input)?,
            parse_node_pattern(right, input)?,
        ));
    }

    Pattern::chain(start, segments)
}

fn parse_node_pattern(node: Node, input: &str) -> Result<NodeElement, CypherError> {
    let mut attributes = Attributes::default();
    for child in named_children(node) {
        match child.kind() {
            "variable" => attributes.variable = Some(parse_identifier(child, input)?),
            "node_labels" => {
                let labels = parse_node_labels(child, input)?;
                if labels.len() > 1 {
                    return Err(CypherError::unsupported(
                        "multiple labels on a node pattern",
                        Span::from_node(child),
                    ));
                }
                attributes.label = labels.into_iter().next();
            }
            "properties" => attributes.properties = parse_properties(child, input)?,
            _ => {}
        }
    }

    Ok(NodeElement::new(attributes))
}

fn parse_relationship_pattern(
    node: Node,
    input: &str,
) -> Result<RelationshipElement, CypherError> {
    let mut attributes = Attributes::default();

    for child in named_children(node) {
        if child.kind() == "relationship_detail" {
            for detail in named_children(child) {
                match detail.kind() {
                    "variable" => attributes.variable = Some(parse_identifier(detail, input)?),
                    "relationship_types" => {
                        let mut types = Vec::new();
                        for rel in named_children(detail) {
                            if rel.kind() == "rel_type_name" {
                                types.push(parse_identifier(rel, input)?);
                            }
                        }
                        if types.len() > 1 {
                            return Err(CypherError::unsupported(
                                "relationship type unions",
                                Span::from_node(detail),
                            ));
                        }
                        attributes.label = types.into_iter().next();
                    }
                    "range_literal" => {
                        return Err(CypherError::unsupported(
                            "variable-length relationships",
                            Span::from_node(detail),
                        ));
                    }
                    "properties" => attributes.properties = parse_properties(detail, input)?,
                    _ => {}
                }
            }
        }
    }

    let text = source_text(node, input)?.trim();
    Ok(RelationshipElement::new(
        attributes,
        text.starts_with('<'),
        text.ends_with('>'),
    ))
}

fn parse_properties(
    node: Node,
    input: &str,
) -> Result<Vec<(String, Expression)>, CypherError> {
    let map = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "map_literal")
        .ok_or_else(|| {
            CypherError::unsupported("non-literal pattern properties", Span::from_node(node))
        })?;
    parse_map_entries(map, input)
}

fn parse_map_entries(
    node: Node,
    input: &str,
) -> Result<Vec<(String, Expression)>, CypherError> {
    let mut entries = Vec::new();
    let mut iter = named_children(node).into_iter();
    while let Some(key_node) = iter.next() {
        if key_node.kind() != "property_key_name" {
            continue;
        }
        let value_node = iter
            .next()
            .ok_or_else(|| CypherError::missing("map value", Span::from_node(node)))?;
        if value_node.kind() != "expression" {
            return Err(CypherError::missing("map value", Span::from_node(node)));
        }
        entries.push((
            parse_identifier(key_node, input)?,
            parse_expression(value_node, input)?,
        ));
    }
    Ok(entries)
}

/// Labels of a `:A:B` chain, whether written as `node_label` children or
/// bare `label_name`s.
fn parse_node_labels(node: Node, input: &str) -> Result<Vec<String>, CypherError> {
    let labels = named_children(node)
        .into_iter()
        .filter_map(|child| match child.kind() {
            "label_name" => Some(child),
            "node_label" => named_children(child)
                .into_iter()
                .find(|name| name.kind() == "label_name"),
            _ => None,
        })
        .map(|name| parse_identifier(name, input))
        .collect::<Result<Vec<_>, _>>()?;
    if labels.is_empty() {
        return Err(CypherError::missing("label name", Span::from_node(node)));
    }
    Ok(labels)
}

fn parse_expression(node: Node, input: &str) -> Result<Expression, CypherError> {
    match node.kind() {
        "expression" | "parenthesized_expression" => {
            let child = named_children(node)
                .into_iter()
                .next()
                .ok_or_else(|| CypherError::missing("expression", Span::from_node(node)))?;
            parse_expression(child, input)
        }
        "or_expression" => {
            let (left, right) = parse_operands(node, input)?;
            Ok(Expression::Or { left, right })
        }
        "xor_expression" => {
            let (left, right) = parse_operands(node, input)?;
            Ok(Expression::Xor { left, right })
        }
        "and_expression" => {
            let (left, right) = parse_operands(node, input)?;
            Ok(Expression::And { left, right })
        }
        "not_expression" => {
            let child = named_children(node)
                .into_iter()
                .next()
                .ok_or_else(|| CypherError::missing("not expression", Span::from_node(node)))?;
            Ok(Expression::Not {
                operand: Box::new(parse_expression(child, input)?),
            })
        }
        "comparison_expression" => parse_comparison(node, input),
        "unary_expression" => parse_unary(node, input),
        "additive_expression" => unsupported_operator(node, input, &["+", "-"]),
        "multiplicative_expression" => unsupported_operator(node, input, &["*", "/", "%"]),
        "exponential_expression" => unsupported_operator(node, input, &["^"]),
        "string_list_null_predicate_expression" => parse_predicate(node, input),
        "property_or_labels_expression" => parse_property_access(node, input),
        "list_operator_expression" => Ok(Expression::Unsupported("[]".to_string())),
        "case_expression" => Ok(Expression::Unsupported("CASE".to_string())),
        "list_comprehension" => Ok(Expression::Unsupported("list comprehension".to_string())),
        "quantifier" => Ok(Expression::Unsupported("quantifier".to_string())),
        "existential_subquery" => Ok(Expression::Unsupported("EXISTS".to_string())),
        "parameter" => Ok(Expression::Unsupported(
            source_text(node, input)?.trim().to_string(),
        )),
        "function_invocation" => parse_function(node, input),
        "literal" | "string_literal" | "number_literal" | "boolean_literal" | "null_literal"
        | "list_literal" | "map_literal" => parse_literal(node, input),
        "variable" => Ok(Expression::variable(parse_identifier(node, input)?)),
        "atom" => parse_atom(node, input),
        other => Err(CypherError::unsupported(other, Span::from_node(node))),
    }
}

fn parse_operands(
    node: Node,
    input: &str,
) -> Result<(Box<Expression>, Box<Expression>), CypherError> {
    let mut named = named_children(node).into_iter();
    let left = named
        .next()
        .ok_or_else(|| CypherError::missing("left operand", Span::from_node(node)))?;
    let right = named
        .next()
        .ok_or_else(|| CypherError::missing("right operand", Span::from_node(node)))?;
    Ok((
        Box::new(parse_expression(left, input)?),
        Box::new(parse_expression(right, input)?),
    ))
}

fn parse_atom(node: Node, input: &str) -> Result<Expression, CypherError> {
    if node.named_child_count() > 0 {
        let child = named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| CypherError::missing("atom", Span::from_node(node)))?;
        return parse_expression(child, input);
    }
    let text = source_text(node, input)?;
    if is_count_star(text) {
        return Ok(Expression::CountStar);
    }
    Err(CypherError::unsupported("atom", Span::from_node(node)))
}

fn is_count_star(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case("count(*)")
}

fn parse_function(node: Node, input: &str) -> Result<Expression, CypherError> {
    let text = source_text(node, input)?;
    if is_count_star(text) {
        return Ok(Expression::CountStar);
    }
    let name_node = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "function_name")
        .ok_or_else(|| CypherError::missing("function name", Span::from_node(node)))?;
    Ok(Expression::Unsupported(format!(
        "{}()",
        source_text(name_node, input)?.trim()
    )))
}

fn unsupported_operator(
    node: Node,
    input: &str,
    ops: &[&'static str],
) -> Result<Expression, CypherError> {
    Ok(Expression::Unsupported(find_operator(node, input, ops)?.to_string()))
}

fn parse_unary(node: Node, input: &str) -> Result<Expression, CypherError> {
    let child = named_children(node)
        .into_iter()
        .next()
        .ok_or_else(|| CypherError::missing("unary expression", Span::from_node(node)))?;
    let operand = parse_expression(child, input)?;
    if find_operator(node, input, &["+", "-"])? == "-" {
        Ok(Expression::Negate {
            operand: Box::new(operand),
        })
    } else {
        Ok(operand)
    }
}

/// Picks the operator token of `node` from `ops`. Tables list longer
/// spellings first so the text fallback never matches a prefix.
fn find_operator(
    node: Node,
    input: &str,
    ops: &[&'static str],
) -> Result<&'static str, CypherError> {
    let mut cursor = node.walk();
    let token = node
        .children(&mut cursor)
        .filter(|child| !child.is_named())
        .find_map(|child| ops.iter().copied().find(|op| *op == child.kind()));
    if let Some(op) = token {
        return Ok(op);
    }
    let text = source_text(node, input)?;
    ops.iter()
        .copied()
        .find(|op| text.contains(op))
        .ok_or_else(|| CypherError::unsupported("operator", Span::from_node(node)))
}

const COMPARISON_OPERATORS: [&str; 8] = ["<>", "!=", "<=", ">=", "==", "=", "<", ">"];

fn parse_comparison(node: Node, input: &str) -> Result<Expression, CypherError> {
    let (left, right) = parse_operands(node, input)?;
    let op = find_operator(node, input, &COMPARISON_OPERATORS)?;
    comparison(op, left, right)
        .ok_or_else(|| CypherError::unsupported("comparison operator", Span::from_node(node)))
}

fn comparison(op: &str, left: Box<Expression>, right: Box<Expression>) -> Option<Expression> {
    let expr = match op {
        "=" | "==" => Expression::Equal { left, right },
        "<>" | "!=" => Expression::NotEqual { left, right },
        "<=" => Expression::LessEqual { left, right },
        ">=" => Expression::GreaterEqual { left, right },
        "<" => Expression::Less { left, right },
        ">" => Expression::Greater { left, right },
        _ => return None,
    };
    Some(expr)
}

fn parse_predicate(node: Node, input: &str) -> Result<Expression, CypherError> {
    let mut named = named_children(node).into_iter();
    let left = named
        .next()
        .ok_or_else(|| CypherError::missing("predicate left", Span::from_node(node)))?;
    let predicate = named
        .next()
        .ok_or_else(|| CypherError::missing("predicate", Span::from_node(node)))?;
    match predicate.kind() {
        "null_predicate_expression" => {
            let operand = Box::new(parse_expression(left, input)?);
            let text = source_text(predicate, input)?.to_ascii_lowercase();
            if text.contains("not") {
                Ok(Expression::Not {
                    operand: Box::new(Expression::IsNull { operand }),
                })
            } else {
                Ok(Expression::IsNull { operand })
            }
        }
        "list_predicate_expression" => Ok(Expression::Unsupported("IN".to_string())),
        "string_predicate_expression" => {
            let text = source_text(predicate, input)?.to_ascii_uppercase();
            let op = ["STARTS WITH", "ENDS WITH", "CONTAINS"]
                .into_iter()
                .find(|op| text.contains(op))
                .unwrap_or("string predicate");
            Ok(Expression::Unsupported(op.to_string()))
        }
        other => Err(CypherError::unsupported(other, Span::from_node(predicate))),
    }
}

fn parse_property_access(node: Node, input: &str) -> Result<Expression, CypherError> {
    let mut named = named_children(node).into_iter();
    let base = named
        .next()
        .ok_or_else(|| CypherError::missing("property base", Span::from_node(node)))?;
    let mut expr = parse_expression(base, input)?;

    for child in named {
        match child.kind() {
            "property_lookup" => {
                let key = named_children(child)
                    .into_iter()
                    .find(|c| c.kind() == "property_key_name")
                    .ok_or_else(|| CypherError::missing("property key", Span::from_node(child)))?;
                expr = Expression::property(expr, parse_identifier(key, input)?);
            }
            "node_labels" => {
                expr = type_equals_chain(expr, parse_node_labels(child, input)?);
            }
            _ => {}
        }
    }

    Ok(expr)
}

/// `n:A:B` becomes `n:A AND n:B`.
fn type_equals_chain(operand: Expression, labels: Vec<String>) -> Expression {
    let mut checks = labels.into_iter().map(|type_name| Expression::TypeEquals {
        operand: Box::new(operand.clone()),
        type_name,
    });
    let first = checks.next();
    let combined = checks.fold(first, |acc, next| {
        acc.map(|left| Expression::And {
            left: Box::new(left),
            right: Box::new(next),
        })
    });
    combined.unwrap_or(operand)
}

fn parse_literal(node: Node, input: &str) -> Result<Expression, CypherError> {
    let expr = match node.kind() {
        "literal" => {
            let child = named_children(node)
                .into_iter()
                .next()
                .ok_or_else(|| CypherError::missing("literal", Span::from_node(node)))?;
            return parse_literal(child, input);
        }
        "string_literal" => Expression::StringLiteral(unescape_string(source_text(node, input)?)),
        "number_literal" => {
            let text = source_text(node, input)?.trim();
            check_number(text)?;
            Expression::NumericLiteral(text.to_string())
        }
        "boolean_literal" => Expression::BooleanLiteral(source_text(node, input)?.trim().to_string()),
        "null_literal" => Expression::Keyword(source_text(node, input)?.trim().to_ascii_uppercase()),
        "list_literal" => Expression::Unsupported("list literal".to_string()),
        "map_literal" => Expression::Unsupported("map literal".to_string()),
        other => {
            return Err(CypherError::unsupported(other, Span::from_node(node)));
        }
    };
    Ok(expr)
}

fn check_number(text: &str) -> Result<(), CypherError> {
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text.parse::<f64>()
            .map(|_| ())
            .map_err(|_| CypherError::invalid_literal("number literal", text.to_string()))
    } else {
        text.parse::<i64>()
            .map(|_| ())
            .map_err(|_| CypherError::invalid_literal("integer literal", text.to_string()))
    }
}

/// Identifier text with surrounding backticks removed.
fn parse_identifier(node: Node, input: &str) -> Result<String, CypherError> {
    let text = source_text(node, input)?.trim();
    let name = text
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
        .unwrap_or(text);
    Ok(name.to_string())
}

fn unescape_string(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    let mut out = String::new();
    let mut chars = unquoted.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn source_text<'a>(node: Node, input: &'a str) -> Result<&'a str, CypherError> {
    input
        .get(node.byte_range())
        .ok_or_else(|| CypherError::invalid_text(Span::from_node(node)))
}

fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

impl Span {
    fn from_node(node: Node) -> Self {
        let range = node.range();
        Span {
            start_byte: range.start_byte,
            end_byte: range.end_byte,
            start_row: range.start_point.row,
            start_col: range.start_point.column,
            end_row: range.end_point.row,
            end_col: range.end_point.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Box<Expression> {
        Box::new(Expression::number(text))
    }

    #[test]
    fn maps_comparison_operators_literally() {
        assert!(matches!(
            comparison("==", num("1"), num("2")),
            Some(Expression::Equal { .. })
        ));
        assert!(matches!(
            comparison("!=", num("1"), num("2")),
            Some(Expression::NotEqual { .. })
        ));
        assert!(matches!(
            comparison("<>", num("1"), num("2")),
            Some(Expression::NotEqual { .. })
        ));
        assert!(matches!(
            comparison(">=", num("1"), num("2")),
            Some(Expression::GreaterEqual { .. })
        ));
        assert!(comparison("=~", num("1"), num("2")).is_none());
    }

    #[test]
    fn normalizes_alternate_comparison_spellings() {
        assert_eq!(
            normalize_comparisons("WHERE a != 1 AND b == 2"),
            "WHERE a <> 1 AND b =  2"
        );
        assert_eq!(
            normalize_comparisons("WHERE a.Name = 'x != y' OR a.`b==c` = 1"),
            "WHERE a.Name = 'x != y' OR a.`b==c` = 1"
        );
        assert_eq!(
            normalize_comparisons(r"WHERE a = 'it\'s != 1' AND b != 2"),
            r"WHERE a = 'it\'s != 1' AND b <> 2"
        );
        assert!(matches!(
            normalize_comparisons("WHERE a <> 1"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn label_chain_joins_with_and() {
        let expr = type_equals_chain(
            Expression::variable("n"),
            vec!["File".to_string(), "Class".to_string()],
        );
        assert_eq!(expr.to_string(), "n:File AND n:Class");
    }

    #[test]
    fn count_star_ignores_spacing_and_case() {
        assert!(is_count_star("COUNT( * )"));
        assert!(is_count_star("count(*)"));
        assert!(!is_count_star("count(n)"));
    }
}
