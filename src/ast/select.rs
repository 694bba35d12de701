//! SELECT statement grammar: CTEs, joins, window functions, SETTINGS.

use super::expr::{Expr, OrderByItem};

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: Box<SelectStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    QualifiedWildcard(Vec<String>),
    Expr(Expr),
    ExprWithAlias(Expr, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: Vec<String>,
        alias: Option<String>,
        final_: bool,
    },
    Subquery {
        query: Box<SelectStatement>,
        alias: Option<String>,
    },
    TableFunction {
        name: String,
        args: Vec<Expr>,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Array,
    Asof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub global: bool,
    pub relation: TableFactor,
    pub constraint: JoinConstraint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupByModifier {
    Cube,
    Rollup,
    Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    Exprs {
        exprs: Vec<Expr>,
        with: Option<GroupByModifier>,
    },
    All,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub ctes: Vec<Cte>,
    pub recursive: bool,
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableWithJoins>,
    pub where_clause: Option<Expr>,
    pub group_by: Option<GroupBy>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub settings: Vec<(String, String)>,
}
