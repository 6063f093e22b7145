use crate::ast::*;
use crate::CypherError;
use std::collections::HashSet;

/// Checks the shape of a parsed query before it reaches the engine.
///
/// Variable kind conflicts are already rejected while the MATCH clause is
/// built; this covers the RETURN side and placeholder misuse.
pub fn validate_query(query: &Query) -> Result<(), CypherError> {
    let match_clause = &query.match_clause;
    let return_clause = &query.return_clause;

    if let Some(where_clause) = match_clause.where_clause() {
        if where_clause.any(&|expr| matches!(expr, Expression::CountStar)) {
            return Err(CypherError::semantic(
                "count(*) is not allowed in WHERE",
                match_clause.span,
            ));
        }
    }

    if return_clause.items.is_empty() && !return_clause.anything {
        return Err(CypherError::semantic(
            "RETURN requires at least one item",
            return_clause.span,
        ));
    }

    let mut columns = HashSet::new();
    for item in &return_clause.items {
        let name = item.column_name();
        if !columns.insert(name.clone()) {
            return Err(CypherError::semantic(
                format!("duplicate column name: {name}"),
                return_clause.span,
            ));
        }
    }

    if return_clause.anything && match_clause.variables().is_empty() {
        return Err(CypherError::semantic(
            "RETURN * requires at least one named pattern variable",
            return_clause.span,
        ));
    }

    if let Some(order) = &return_clause.order_by {
        if order.is_empty() {
            return Err(CypherError::semantic(
                "ORDER BY requires at least one sort key",
                return_clause.span,
            ));
        }
    }

    Ok(())
}
