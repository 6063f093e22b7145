use crate::pattern::MatchClause;
use std::fmt;
use strum_macros::Display;

/// Static kind of a pattern variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
}

/// Expression tree evaluated against one binding at a time.
///
/// Every operator has its own constructor carrying exactly the operands its
/// arity requires. Literal leaves keep their source text; conversion to a
/// runtime value happens at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Xor {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Equal {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    NotEqual {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LessEqual {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    GreaterEqual {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Less {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Greater {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    IsNull {
        operand: Box<Expression>,
    },
    IsNotNull {
        operand: Box<Expression>,
    },
    TypeEquals {
        operand: Box<Expression>,
        type_name: String,
    },
    Negate {
        operand: Box<Expression>,
    },
    Property {
        operand: Box<Expression>,
        key: String,
    },
    BooleanLiteral(String),
    NumericLiteral(String),
    StringLiteral(String),
    Keyword(String),
    Variable {
        name: String,
        kind: Option<ElementKind>,
    },
    CountStar,
    /// Operator accepted by the grammar but not by the evaluator.
    Unsupported(String),
}

impl Expression {
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable {
            name: name.into(),
            kind: None,
        }
    }

    pub fn typed_variable(name: impl Into<String>, kind: ElementKind) -> Self {
        Expression::Variable {
            name: name.into(),
            kind: Some(kind),
        }
    }

    pub fn property(operand: Expression, key: impl Into<String>) -> Self {
        Expression::Property {
            operand: Box::new(operand),
            key: key.into(),
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expression::NumericLiteral(text.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expression::StringLiteral(text.into())
    }

    pub fn boolean(value: bool) -> Self {
        Expression::BooleanLiteral(if value { "TRUE" } else { "FALSE" }.to_string())
    }

    /// Upper-case operator tag, used in diagnostics.
    pub fn operator(&self) -> &'static str {
        match self {
            Expression::Or { .. } => "OR",
            Expression::Xor { .. } => "XOR",
            Expression::And { .. } => "AND",
            Expression::Not { .. } => "NOT",
            Expression::Equal { .. } => "EQ",
            Expression::NotEqual { .. } => "NEQ",
            Expression::LessEqual { .. } => "LE",
            Expression::GreaterEqual { .. } => "GE",
            Expression::Less { .. } => "LT",
            Expression::Greater { .. } => "GT",
            Expression::IsNull { .. } => "IS_NULL",
            Expression::IsNotNull { .. } => "IS_NOT_NULL",
            Expression::TypeEquals { .. } => "TYPE_EQUALS",
            Expression::Negate { .. } => "SIGN",
            Expression::Property { .. } => "PROPERTY_ACCESS",
            Expression::BooleanLiteral(_) => "BOOLEAN_LITERAL",
            Expression::NumericLiteral(_) => "NUMERIC_LITERAL",
            Expression::StringLiteral(_) => "STRING_LITERAL",
            Expression::Keyword(_) => "KEYWORD",
            Expression::Variable { .. } => "VARIABLE",
            Expression::CountStar => "COUNT_STAR",
            Expression::Unsupported(_) => "UNSUPPORTED",
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Or { left, right }
            | Expression::Xor { left, right }
            | Expression::And { left, right }
            | Expression::Equal { left, right }
            | Expression::NotEqual { left, right }
            | Expression::LessEqual { left, right }
            | Expression::GreaterEqual { left, right }
            | Expression::Less { left, right }
            | Expression::Greater { left, right } => vec![&**left, &**right],
            Expression::Not { operand }
            | Expression::IsNull { operand }
            | Expression::IsNotNull { operand }
            | Expression::TypeEquals { operand, .. }
            | Expression::Negate { operand }
            | Expression::Property { operand, .. } => vec![&**operand],
            Expression::BooleanLiteral(_)
            | Expression::NumericLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::Keyword(_)
            | Expression::Variable { .. }
            | Expression::CountStar
            | Expression::Unsupported(_) => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Expression::Or { left, right }
            | Expression::Xor { left, right }
            | Expression::And { left, right }
            | Expression::Equal { left, right }
            | Expression::NotEqual { left, right }
            | Expression::LessEqual { left, right }
            | Expression::GreaterEqual { left, right }
            | Expression::Less { left, right }
            | Expression::Greater { left, right } => vec![&mut **left, &mut **right],
            Expression::Not { operand }
            | Expression::IsNull { operand }
            | Expression::IsNotNull { operand }
            | Expression::TypeEquals { operand, .. }
            | Expression::Negate { operand }
            | Expression::Property { operand, .. } => vec![&mut **operand],
            _ => Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Returns true if `predicate` holds for this node or any descendant.
    pub fn any(&self, predicate: &impl Fn(&Expression) -> bool) -> bool {
        predicate(self) || self.children().into_iter().any(|child| child.any(predicate))
    }

    /// Assigns the declared kind to every variable leaf `lookup` knows about.
    pub fn resolve_variables(&mut self, lookup: &impl Fn(&str) -> Option<ElementKind>) {
        if let Expression::Variable { name, kind } = self {
            if let Some(resolved) = lookup(name) {
                *kind = Some(resolved);
            }
            return;
        }
        for child in self.children_mut() {
            child.resolve_variables(lookup);
        }
    }

    fn is_compound(&self) -> bool {
        self.children().len() == 2
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expression) -> fmt::Result {
    if expr.is_compound() {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_binary(
    f: &mut fmt::Formatter<'_>,
    left: &Expression,
    op: &str,
    right: &Expression,
) -> fmt::Result {
    write_operand(f, left)?;
    write!(f, " {op} ")?;
    write_operand(f, right)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Or { left, right } => write_binary(f, left, "OR", right),
            Expression::Xor { left, right } => write_binary(f, left, "XOR", right),
            Expression::And { left, right } => write_binary(f, left, "AND", right),
            Expression::Not { operand } => {
                write!(f, "NOT ")?;
                write_operand(f, operand)
            }
            Expression::Equal { left, right } => write_binary(f, left, "=", right),
            Expression::NotEqual { left, right } => write_binary(f, left, "<>", right),
            Expression::LessEqual { left, right } => write_binary(f, left, "<=", right),
            Expression::GreaterEqual { left, right } => write_binary(f, left, ">=", right),
            Expression::Less { left, right } => write_binary(f, left, "<", right),
            Expression::Greater { left, right } => write_binary(f, left, ">", right),
            Expression::IsNull { operand } => {
                write_operand(f, operand)?;
                write!(f, " IS NULL")
            }
            Expression::IsNotNull { operand } => {
                write_operand(f, operand)?;
                write!(f, " IS NOT NULL")
            }
            Expression::TypeEquals { operand, type_name } => {
                write_operand(f, operand)?;
                write!(f, ":{type_name}")
            }
            Expression::Negate { operand } => {
                write!(f, "-")?;
                write_operand(f, operand)
            }
            Expression::Property { operand, key } => {
                write_operand(f, operand)?;
                write!(f, ".{key}")
            }
            Expression::BooleanLiteral(text)
            | Expression::NumericLiteral(text)
            | Expression::Keyword(text)
            | Expression::Unsupported(text) => write!(f, "{text}"),
            Expression::StringLiteral(text) => write!(f, "'{text}'"),
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::CountStar => write!(f, "count(*)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub alias: Option<String>,
    pub expression: Expression,
}

impl ReturnItem {
    pub fn new(expression: Expression) -> Self {
        ReturnItem {
            alias: None,
            expression,
        }
    }

    pub fn aliased(expression: Expression, alias: impl Into<String>) -> Self {
        ReturnItem {
            alias: Some(alias.into()),
            expression,
        }
    }

    /// Alias if present, otherwise the expression's source form.
    pub fn column_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expression.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expression: Expression,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnClause {
    pub items: Vec<ReturnItem>,
    /// `RETURN *`
    pub anything: bool,
    pub distinct: bool,
    pub order_by: Option<Vec<OrderItem>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub span: Span,
}

impl ReturnClause {
    fn resolve_variables(&mut self, lookup: &impl Fn(&str) -> Option<ElementKind>) {
        for item in &mut self.items {
            item.expression.resolve_variables(lookup);
        }
        if let Some(order) = &mut self.order_by {
            for item in order {
                item.expression.resolve_variables(lookup);
            }
        }
    }
}

/// Root of a `MATCH … WHERE … RETURN …` query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub match_clause: MatchClause,
    pub return_clause: ReturnClause,
}

impl Query {
    /// Binds the RETURN clause's variable leaves to the kinds declared by the
    /// MATCH clause.
    pub fn new(match_clause: MatchClause, mut return_clause: ReturnClause) -> Self {
        return_clause.resolve_variables(&|name| match_clause.kind_of(name));
        Query {
            match_clause,
            return_clause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Span {
    pub fn display(&self) -> String {
        format!(
            "{}:{}-{}:{}",
            self.start_row + 1,
            self.start_col + 1,
            self.end_row + 1,
            self.end_col + 1
        )
    }
}
