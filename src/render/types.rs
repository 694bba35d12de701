use crate::ast::{ColumnType, PrimitiveType};

pub fn render_column_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Primitive(p) => render_primitive(p),
        ColumnType::Nullable(inner) => format!("Nullable({})", render_column_type(inner)),
        ColumnType::LowCardinality(inner) => format!("LowCardinality({})", render_column_type(inner)),
        ColumnType::Array(inner) => format!("Array({})", render_column_type(inner)),
        ColumnType::Map(k, v) => format!("Map({}, {})", render_column_type(k), render_column_type(v)),
        ColumnType::Tuple(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|f| match &f.name {
                    Some(n) => format!("{n} {}", render_column_type(&f.ty)),
                    None => render_column_type(&f.ty),
                })
                .collect();
            format!("Tuple({})", rendered.join(", "))
        }
        ColumnType::Nested(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|f| format!("{} {}", f.name, render_column_type(&f.ty)))
                .collect();
            format!("Nested({})", rendered.join(", "))
        }
        ColumnType::FixedString(n) => format!("FixedString({n})"),
        ColumnType::Decimal { precision, scale } => format!("Decimal({precision}, {scale})"),
        ColumnType::DateTime64 { precision, timezone } => match timezone {
            Some(tz) => format!("DateTime64({precision}, '{tz}')"),
            None => format!("DateTime64({precision})"),
        },
        ColumnType::Enum { width, members } => {
            let name = match width {
                crate::ast::EnumWidth::Enum8 => "Enum8",
                crate::ast::EnumWidth::Enum16 => "Enum16",
            };
            let rendered: Vec<String> = members
                .iter()
                .map(|m| format!("'{}' = {}", m.name, m.value))
                .collect();
            format!("{name}({})", rendered.join(", "))
        }
        ColumnType::Parametric { name, raw_params } => {
            if raw_params.is_empty() {
                name.clone()
            } else {
                format!("{name}({raw_params})")
            }
        }
    }
}

fn render_primitive(p: &PrimitiveType) -> String {
    p.to_string()
}
