use crate::ast::{
    GroupBy, GroupByModifier, Join, JoinConstraint, JoinKind, SelectItem, SelectStatement,
    TableFactor, TableWithJoins,
};

use super::expr::{render_expr, render_order_by_items, render_settings_list};
use super::ident::quote_ident;

pub fn render_select(stmt: &SelectStatement) -> String {
    let mut out = String::new();

    if !stmt.ctes.is_empty() {
        out.push_str("WITH ");
        if stmt.recursive {
            out.push_str("RECURSIVE ");
        }
        let rendered: Vec<String> = stmt
            .ctes
            .iter()
            .map(|cte| format!("{} AS ({})", quote_ident(&cte.name), render_select(&cte.query)))
            .collect();
        out.push_str(&rendered.join(", "));
        out.push(' ');
    }

    out.push_str("SELECT ");
    if stmt.distinct {
        out.push_str("DISTINCT ");
    }
    let projection: Vec<String> = stmt.projection.iter().map(render_select_item).collect();
    out.push_str(&projection.join(", "));

    if !stmt.from.is_empty() {
        out.push_str(" FROM ");
        let from: Vec<String> = stmt.from.iter().map(render_table_with_joins).collect();
        out.push_str(&from.join(", "));
    }

    if let Some(where_clause) = &stmt.where_clause {
        out.push_str(" WHERE ");
        out.push_str(&render_expr(where_clause));
    }

    if let Some(group_by) = &stmt.group_by {
        out.push_str(" GROUP BY ");
        out.push_str(&render_group_by(group_by));
    }

    if let Some(having) = &stmt.having {
        out.push_str(" HAVING ");
        out.push_str(&render_expr(having));
    }

    if !stmt.order_by.is_empty() {
        out.push_str(" ORDER BY ");
        out.push_str(&render_order_by_items(&stmt.order_by));
    }

    if let Some(limit) = &stmt.limit {
        out.push_str(" LIMIT ");
        if let Some(offset) = &stmt.offset {
            out.push_str(&render_expr(offset));
            out.push_str(", ");
        }
        out.push_str(&render_expr(limit));
    } else if let Some(offset) = &stmt.offset {
        out.push_str(" OFFSET ");
        out.push_str(&render_expr(offset));
    }

    if !stmt.settings.is_empty() {
        out.push_str(" SETTINGS ");
        out.push_str(&render_settings_list(&stmt.settings));
    }

    out
}

fn render_select_item(item: &SelectItem) -> String {
    match item {
        SelectItem::Wildcard => "*".to_string(),
        SelectItem::QualifiedWildcard(path) => {
            format!("{}.*", path.iter().map(|p| quote_ident(p)).collect::<Vec<_>>().join("."))
        }
        SelectItem::Expr(expr) => render_expr(expr),
        SelectItem::ExprWithAlias(expr, alias) => format!("{} AS {}", render_expr(expr), quote_ident(alias)),
    }
}

fn render_group_by(group_by: &GroupBy) -> String {
    match group_by {
        GroupBy::All => "ALL".to_string(),
        GroupBy::Exprs { exprs, with } => {
            let rendered: Vec<String> = exprs.iter().map(render_expr).collect();
            let body = rendered.join(", ");
            match with {
                Some(GroupByModifier::Cube) => format!("{body} WITH CUBE"),
                Some(GroupByModifier::Rollup) => format!("{body} WITH ROLLUP"),
                Some(GroupByModifier::Totals) => format!("{body} WITH TOTALS"),
                None => body,
            }
        }
    }
}

fn render_table_factor(factor: &TableFactor) -> String {
    match factor {
        TableFactor::Table { name, alias, final_ } => {
            let mut out = name.iter().map(|p| quote_ident(p)).collect::<Vec<_>>().join(".");
            if *final_ {
                out.push_str(" FINAL");
            }
            if let Some(alias) = alias {
                out.push_str(" AS ");
                out.push_str(&quote_ident(alias));
            }
            out
        }
        TableFactor::Subquery { query, alias } => {
            let mut out = format!("({})", render_select(query));
            if let Some(alias) = alias {
                out.push_str(" AS ");
                out.push_str(&quote_ident(alias));
            }
            out
        }
        TableFactor::TableFunction { name, args, alias } => {
            let rendered: Vec<String> = args.iter().map(render_expr).collect();
            let mut out = format!("{name}({})", rendered.join(", "));
            if let Some(alias) = alias {
                out.push_str(" AS ");
                out.push_str(&quote_ident(alias));
            }
            out
        }
    }
}

fn render_table_with_joins(twj: &TableWithJoins) -> String {
    let mut out = render_table_factor(&twj.relation);
    for join in &twj.joins {
        out.push(' ');
        out.push_str(&render_join(join));
    }
    out
}

fn render_join(join: &Join) -> String {
    let mut out = String::new();
    if join.global {
        out.push_str("GLOBAL ");
    }
    out.push_str(match join.kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
        JoinKind::Right => "RIGHT JOIN",
        JoinKind::Full => "FULL JOIN",
        JoinKind::Cross => "CROSS JOIN",
        JoinKind::Array => "ARRAY JOIN",
        JoinKind::Asof => "ASOF JOIN",
    });
    out.push(' ');
    out.push_str(&render_table_factor(&join.relation));
    match &join.constraint {
        JoinConstraint::On(expr) => {
            out.push_str(" ON ");
            out.push_str(&render_expr(expr));
        }
        JoinConstraint::Using(cols) => {
            out.push_str(" USING (");
            out.push_str(&cols.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "));
            out.push(')');
        }
        JoinConstraint::None => {}
    }
    out
}
