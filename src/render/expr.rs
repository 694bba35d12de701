use crate::ast::{
    BinaryOp, Expr, FrameBound, FrameUnits, Identifier, Literal, NullsOrder, OrderByItem, UnaryOp,
    WindowSpec,
};

use super::ident::quote_ident;
use super::select::render_select;

pub fn render_identifier(id: &Identifier) -> String {
    id.0.iter().map(|p| quote_ident(p)).collect::<Vec<_>>().join(".")
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Or => "OR",
        BinaryOp::And => "AND",
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::Plus => "+",
        BinaryOp::Minus => "-",
        BinaryOp::Concat => "||",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
    }
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => render_literal(lit),
        Expr::Identifier(id) => render_identifier(id),
        Expr::Wildcard => "*".to_string(),
        Expr::QualifiedWildcard(id) => format!("{}.*", render_identifier(id)),
        Expr::FunctionCall { name, distinct, args, over } => {
            let prefix = if *distinct { "DISTINCT " } else { "" };
            let rendered_args: Vec<String> = args.iter().map(render_expr).collect();
            let mut out = format!("{name}({prefix}{})", rendered_args.join(", "));
            if let Some(over) = over {
                out.push_str(" OVER (");
                out.push_str(&render_window_spec(over));
                out.push(')');
            }
            out
        }
        Expr::BinaryOp { left, op, right } => {
            format!("{} {} {}", render_expr(left), binary_op_str(*op), render_expr(right))
        }
        Expr::UnaryOp { op, expr } => match op {
            UnaryOp::Neg => format!("-{}", render_expr(expr)),
            UnaryOp::Plus => format!("+{}", render_expr(expr)),
            UnaryOp::Not => format!("NOT {}", render_expr(expr)),
        },
        Expr::IsNull { expr, negated } => {
            format!("{} IS{} NULL", render_expr(expr), if *negated { " NOT" } else { "" })
        }
        Expr::Between { expr, low, high, negated } => format!(
            "{}{} BETWEEN {} AND {}",
            render_expr(expr),
            if *negated { " NOT" } else { "" },
            render_expr(low),
            render_expr(high)
        ),
        Expr::InList { expr, list, negated } => {
            let rendered: Vec<String> = list.iter().map(render_expr).collect();
            format!(
                "{}{} IN ({})",
                render_expr(expr),
                if *negated { " NOT" } else { "" },
                rendered.join(", ")
            )
        }
        Expr::InSubquery { expr, subquery, negated } => format!(
            "{}{} IN ({})",
            render_expr(expr),
            if *negated { " NOT" } else { "" },
            render_select(subquery)
        ),
        Expr::Like { expr, pattern, negated } => format!(
            "{}{} LIKE {}",
            render_expr(expr),
            if *negated { " NOT" } else { "" },
            render_expr(pattern)
        ),
        Expr::Case { operand, whens, else_ } => {
            let mut out = "CASE".to_string();
            if let Some(operand) = operand {
                out.push(' ');
                out.push_str(&render_expr(operand));
            }
            for (cond, result) in whens {
                out.push_str(&format!(" WHEN {} THEN {}", render_expr(cond), render_expr(result)));
            }
            if let Some(else_) = else_ {
                out.push_str(&format!(" ELSE {}", render_expr(else_)));
            }
            out.push_str(" END");
            out
        }
        Expr::Cast { expr, ty } => {
            format!("CAST({} AS {})", render_expr(expr), super::types::render_column_type(ty))
        }
        Expr::Extract { unit, expr } => format!("EXTRACT({unit} FROM {})", render_expr(expr)),
        Expr::Interval { value, unit } => format!("INTERVAL {} {unit}", render_expr(value)),
        Expr::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_expr).collect();
            format!("[{}]", rendered.join(", "))
        }
        Expr::Tuple(items) => {
            let rendered: Vec<String> = items.iter().map(render_expr).collect();
            format!("({})", rendered.join(", "))
        }
        Expr::MapLiteral(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", render_expr(k), render_expr(v)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Expr::Subquery(query) => format!("({})", render_select(query)),
        Expr::Nested(inner) => format!("({})", render_expr(inner)),
    }
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(n) => n.clone(),
        Literal::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Literal::Bool(b) => if *b { "true".to_string() } else { "false".to_string() },
        Literal::Null => "NULL".to_string(),
    }
}

pub fn render_order_by_items(items: &[OrderByItem]) -> String {
    items
        .iter()
        .map(|item| {
            let mut out = render_expr(&item.expr);
            out.push_str(if item.asc { " ASC" } else { " DESC" });
            if let Some(nulls) = item.nulls {
                out.push_str(match nulls {
                    NullsOrder::First => " NULLS FIRST",
                    NullsOrder::Last => " NULLS LAST",
                });
            }
            out
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_settings_list(settings: &[(String, String)]) -> String {
    settings
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_window_spec(spec: &WindowSpec) -> String {
    let mut parts = Vec::new();
    if !spec.partition_by.is_empty() {
        let rendered: Vec<String> = spec.partition_by.iter().map(render_expr).collect();
        parts.push(format!("PARTITION BY {}", rendered.join(", ")));
    }
    if !spec.order_by.is_empty() {
        parts.push(format!("ORDER BY {}", render_order_by_items(&spec.order_by)));
    }
    if let Some(frame) = &spec.frame {
        let units = match frame.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
        };
        if let Some(end) = &frame.end {
            parts.push(format!(
                "{units} BETWEEN {} AND {}",
                render_frame_bound(&frame.start),
                render_frame_bound(end)
            ));
        } else {
            parts.push(format!("{units} {}", render_frame_bound(&frame.start)));
        }
    }
    parts.join(" ")
}

fn render_frame_bound(bound: &FrameBound) -> String {
    match bound {
        FrameBound::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
        FrameBound::Preceding(expr) => format!("{} PRECEDING", render_expr(expr)),
        FrameBound::CurrentRow => "CURRENT ROW".to_string(),
        FrameBound::Following(expr) => format!("{} FOLLOWING", render_expr(expr)),
        FrameBound::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
    }
}
