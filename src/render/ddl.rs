use crate::ast::*;

use super::expr::render_expr;
use super::ident::{quote_ident, quote_qualified};
use super::select::render_select;
use super::types::render_column_type;

fn on_cluster(cluster: &Option<String>) -> String {
    match cluster {
        Some(c) => format!(" ON CLUSTER {}", quote_ident(c)),
        None => String::new(),
    }
}

fn settings_clause(settings: &[(String, String)]) -> String {
    if settings.is_empty() {
        String::new()
    } else {
        let rendered: Vec<String> = settings.iter().map(|(k, v)| format!("{k} = {v}")).collect();
        format!(" SETTINGS {}", rendered.join(", "))
    }
}

fn comment_clause(comment: &Option<String>) -> String {
    match comment {
        Some(c) => format!(" COMMENT '{}'", c.replace('\'', "\\'")),
        None => String::new(),
    }
}

// ---- Database -------------------------------------------------------

pub fn render_create_database(stmt: &CreateDatabase) -> String {
    let db = &stmt.database;
    let mut out = "CREATE DATABASE".to_string();
    if db.if_not_exists {
        out.push_str(" IF NOT EXISTS");
    }
    out.push(' ');
    out.push_str(&quote_ident(&db.name));
    out.push_str(&on_cluster(&db.cluster));
    if let Some(engine) = &db.engine {
        out.push_str(&format!(" ENGINE = {}", render_engine_spec(engine)));
    }
    out.push_str(&comment_clause(&db.comment));
    out
}

pub fn render_alter_database(stmt: &AlterDatabase) -> String {
    format!(
        "ALTER DATABASE {}{} MODIFY COMMENT '{}'",
        quote_ident(&stmt.name),
        on_cluster(&stmt.cluster),
        stmt.comment.replace('\'', "\\'")
    )
}

pub fn render_engine_spec(engine: &EngineSpec) -> String {
    if engine.params.is_empty() {
        engine.name.clone()
    } else {
        let rendered: Vec<String> = engine.params.iter().map(render_expr).collect();
        format!("{}({})", engine.name, rendered.join(", "))
    }
}

// ---- Columns / indexes / constraints --------------------------------

fn render_codec(codec: &CodecSpec) -> String {
    if codec.args.is_empty() {
        codec.name.clone()
    } else {
        let rendered: Vec<String> = codec.args.iter().map(render_expr).collect();
        format!("{}({})", codec.name, rendered.join(", "))
    }
}

pub fn render_column(col: &Column) -> String {
    let mut out = format!("{} {}", quote_ident(&col.name), render_column_type(&col.data_type));
    if let Some(kind) = col.default_kind {
        let keyword = match kind {
            DefaultKind::Default => "DEFAULT",
            DefaultKind::Materialized => "MATERIALIZED",
            DefaultKind::Ephemeral => "EPHEMERAL",
            DefaultKind::Alias => "ALIAS",
        };
        out.push(' ');
        out.push_str(keyword);
        if let Some(expr) = &col.default_expr {
            out.push(' ');
            out.push_str(&render_expr(expr));
        }
    }
    if !col.codecs.is_empty() {
        let rendered: Vec<String> = col.codecs.iter().map(render_codec).collect();
        out.push_str(&format!(" CODEC({})", rendered.join(", ")));
    }
    if let Some(ttl) = &col.ttl {
        out.push_str(&format!(" TTL {}", render_expr(ttl)));
    }
    out.push_str(&comment_clause(&col.comment));
    out
}

fn render_index_def(idx: &IndexDef) -> String {
    let type_args = if idx.type_args.is_empty() {
        String::new()
    } else {
        let rendered: Vec<String> = idx.type_args.iter().map(render_expr).collect();
        format!("({})", rendered.join(", "))
    };
    format!(
        "INDEX {} {} TYPE {}{} GRANULARITY {}",
        quote_ident(&idx.name),
        render_expr(&idx.expression),
        idx.index_type,
        type_args,
        idx.granularity
    )
}

fn render_constraint_def(c: &ConstraintDef) -> String {
    format!("CONSTRAINT {} CHECK {}", quote_ident(&c.name), render_expr(&c.expression))
}

fn render_ttl_clause(ttl: &TtlClause) -> String {
    match &ttl.trailing {
        Some(trailing) => format!("{} {}", render_expr(&ttl.expr), trailing),
        None => render_expr(&ttl.expr),
    }
}

pub fn render_engine_clauses(clauses: &TableEngineClauses) -> String {
    let mut out = String::new();
    if let Some(engine) = &clauses.engine {
        out.push_str(&format!(" ENGINE = {}", render_engine_spec(engine)));
    }
    if let Some(order_by) = &clauses.order_by {
        out.push_str(&format!(" ORDER BY {}", render_expr(order_by)));
    }
    if let Some(partition_by) = &clauses.partition_by {
        out.push_str(&format!(" PARTITION BY {}", render_expr(partition_by)));
    }
    if let Some(primary_key) = &clauses.primary_key {
        out.push_str(&format!(" PRIMARY KEY {}", render_expr(primary_key)));
    }
    if let Some(sample_by) = &clauses.sample_by {
        out.push_str(&format!(" SAMPLE BY {}", render_expr(sample_by)));
    }
    if !clauses.ttl.is_empty() {
        let rendered: Vec<String> = clauses.ttl.iter().map(render_ttl_clause).collect();
        out.push_str(&format!(" TTL {}", rendered.join(", ")));
    }
    out.push_str(&settings_clause(&clauses.settings));
    out
}

fn render_table_source(source: &TableSource) -> String {
    match source {
        TableSource::Table(id) => super::expr::render_identifier(id),
        TableSource::TableFunction { name, args } => {
            let rendered: Vec<String> = args.iter().map(render_expr).collect();
            format!("{name}({})", rendered.join(", "))
        }
    }
}

// ---- Table ------------------------------------------------------------

pub fn render_create_table(table: &Table) -> String {
    let mut out = "CREATE ".to_string();
    if table.or_replace {
        out.push_str("OR REPLACE ");
    }
    out.push_str("TABLE ");
    if table.if_not_exists {
        out.push_str("IF NOT EXISTS ");
    }
    out.push_str(&quote_qualified(table.database(), table.name()));
    out.push_str(&on_cluster(&table.cluster));

    if !table.columns.is_empty() || !table.indexes.is_empty() || !table.constraints.is_empty() {
        out.push_str(" (\n");
        let mut items: Vec<String> = Vec::new();
        items.extend(table.columns.iter().map(render_column));
        items.extend(table.indexes.iter().map(render_index_def));
        items.extend(table.constraints.iter().map(render_constraint_def));
        let body: Vec<String> = items.iter().map(|i| format!("    {i}")).collect();
        out.push_str(&body.join(",\n"));
        out.push_str("\n)");
    }

    if let Some(source) = &table.as_source {
        out.push_str(" AS ");
        out.push_str(&render_table_source(source));
    }

    out.push_str(&render_engine_clauses(&table.clauses));
    out.push_str(&comment_clause(&table.comment));
    out
}

pub fn render_alter_table(stmt: &AlterTable) -> String {
    let mut out = format!(
        "ALTER TABLE {}{}",
        quote_qualified(stmt.object.database.as_deref(), &stmt.object.name),
        on_cluster(&stmt.cluster)
    );
    let ops: Vec<String> = stmt.ops.iter().map(render_alter_table_op).collect();
    out.push(' ');
    out.push_str(&ops.join(", "));
    out
}

fn render_alter_table_op(op: &AlterTableOp) -> String {
    match op {
        AlterTableOp::AddColumn { column, if_not_exists, after, first } => {
            let mut out = "ADD COLUMN".to_string();
            if *if_not_exists {
                out.push_str(" IF NOT EXISTS");
            }
            out.push(' ');
            out.push_str(&render_column(column));
            if *first {
                out.push_str(" FIRST");
            } else if let Some(after) = after {
                out.push_str(&format!(" AFTER {}", quote_ident(after)));
            }
            out
        }
        AlterTableOp::DropColumn { name, if_exists } => {
            let mut out = "DROP COLUMN".to_string();
            if *if_exists {
                out.push_str(" IF EXISTS");
            }
            out.push(' ');
            out.push_str(&quote_ident(name));
            out
        }
        AlterTableOp::ModifyColumn { column, if_exists } => {
            let mut out = "MODIFY COLUMN".to_string();
            if *if_exists {
                out.push_str(" IF EXISTS");
            }
            out.push(' ');
            out.push_str(&render_column(column));
            out
        }
        AlterTableOp::RenameColumn { from, to, if_exists } => {
            let mut out = "RENAME COLUMN".to_string();
            if *if_exists {
                out.push_str(" IF EXISTS");
            }
            out.push_str(&format!(" {} TO {}", quote_ident(from), quote_ident(to)));
            out
        }
        AlterTableOp::ModifyComment(comment) => format!("MODIFY COMMENT '{}'", comment.replace('\'', "\\'")),
        AlterTableOp::ModifySetting(settings) => {
            let rendered: Vec<String> = settings.iter().map(|(k, v)| format!("{k} = {v}")).collect();
            format!("MODIFY SETTING {}", rendered.join(", "))
        }
        AlterTableOp::ResetSetting(names) => {
            format!("RESET SETTING {}", names.iter().map(|n| quote_ident(n)).collect::<Vec<_>>().join(", "))
        }
        AlterTableOp::ModifyTtl(ttl) => {
            let rendered: Vec<String> = ttl.iter().map(render_ttl_clause).collect();
            format!("MODIFY TTL {}", rendered.join(", "))
        }
    }
}

// ---- Dictionary ---------------------------------------------------------

fn render_dictionary_column(col: &DictionaryColumn) -> String {
    let mut out = format!("{} {}", quote_ident(&col.name), render_column_type(&col.data_type));
    if let Some(expr) = &col.default_expr {
        out.push_str(&format!(" DEFAULT {}", render_expr(expr)));
    }
    if let Some(expr) = &col.expression_expr {
        out.push_str(&format!(" EXPRESSION {}", render_expr(expr)));
    }
    if col.hierarchical {
        out.push_str(" HIERARCHICAL");
    }
    if col.injective {
        out.push_str(" INJECTIVE");
    }
    if col.is_object_id {
        out.push_str(" IS_OBJECT_ID");
    }
    out.push_str(&comment_clause(&col.comment));
    out
}

fn render_source_arg(value: &SourceArgValue) -> String {
    match value {
        SourceArgValue::Expr(expr) => render_expr(expr),
        SourceArgValue::Nested(source) => render_dictionary_source(source),
    }
}

fn render_dictionary_source(source: &DictionarySource) -> String {
    let rendered: Vec<String> = source
        .args
        .iter()
        .map(|a| format!("{} {}", a.name, render_source_arg(&a.value)))
        .collect();
    format!("{}({})", source.name, rendered.join(" "))
}

fn render_dictionary_layout(layout: &DictionaryLayout) -> String {
    let rendered: Vec<String> = layout
        .params
        .iter()
        .map(|(k, v)| format!("{k} {}", render_expr(v)))
        .collect();
    format!("{}({})", layout.name, rendered.join(" "))
}

fn render_dictionary_lifetime(lifetime: &DictionaryLifetime) -> String {
    match lifetime {
        DictionaryLifetime::Single(expr) => render_expr(expr),
        DictionaryLifetime::Range { min, max } => {
            format!("MIN {} MAX {}", render_expr(min), render_expr(max))
        }
    }
}

pub fn render_create_dictionary(dict: &Dictionary) -> String {
    let mut out = "CREATE ".to_string();
    if dict.or_replace {
        out.push_str("OR REPLACE ");
    }
    out.push_str("DICTIONARY ");
    if dict.if_not_exists {
        out.push_str("IF NOT EXISTS ");
    }
    out.push_str(&quote_qualified(dict.database(), dict.name()));
    out.push_str(&on_cluster(&dict.cluster));

    out.push_str(" (\n");
    let body: Vec<String> = dict
        .columns
        .iter()
        .map(|c| format!("    {}", render_dictionary_column(c)))
        .collect();
    out.push_str(&body.join(",\n"));
    out.push_str("\n)");

    if !dict.primary_key.is_empty() {
        out.push_str(&format!(
            " PRIMARY KEY {}",
            dict.primary_key.iter().map(|p| quote_ident(p)).collect::<Vec<_>>().join(", ")
        ));
    }
    out.push_str(&format!(" SOURCE({})", render_dictionary_source(&dict.source)));
    out.push_str(&format!(" LAYOUT({})", render_dictionary_layout(&dict.layout)));
    if let Some(lifetime) = &dict.lifetime {
        out.push_str(&format!(" LIFETIME({})", render_dictionary_lifetime(lifetime)));
    }
    out.push_str(&settings_clause(&dict.settings));
    out.push_str(&comment_clause(&dict.comment));
    out
}

// ---- Views ---------------------------------------------------------------

pub fn render_create_view(view: &RegularView) -> String {
    let mut out = "CREATE ".to_string();
    if view.or_replace {
        out.push_str("OR REPLACE ");
    }
    out.push_str("VIEW ");
    if view.if_not_exists {
        out.push_str("IF NOT EXISTS ");
    }
    out.push_str(&quote_qualified(view.object.database.as_deref(), &view.object.name));
    out.push_str(&on_cluster(&view.cluster));
    out.push_str(&comment_clause(&view.comment));
    out.push_str(" AS ");
    out.push_str(&render_select(&view.query));
    out
}

fn render_refresh_interval(n: u64, unit: RefreshUnit) -> String {
    let word = match unit {
        RefreshUnit::Second => "SECOND",
        RefreshUnit::Minute => "MINUTE",
        RefreshUnit::Hour => "HOUR",
        RefreshUnit::Day => "DAY",
        RefreshUnit::Week => "WEEK",
        RefreshUnit::Month => "MONTH",
        RefreshUnit::Year => "YEAR",
    };
    format!("{n} {word}")
}

fn render_refresh_policy(policy: &RefreshPolicy) -> String {
    let mut out = format!("EVERY {}", render_refresh_interval(policy.every.0, policy.every.1));
    if let Some(offset) = policy.offset {
        out.push_str(&format!(" OFFSET {}", render_refresh_interval(offset.0, offset.1)));
    }
    if let Some(append_to) = &policy.append_to {
        out.push_str(&format!(" APPEND TO {}", super::expr::render_identifier(append_to)));
    }
    out
}

pub fn render_create_materialized_view(view: &MaterializedView) -> String {
    let mut out = "CREATE ".to_string();
    if view.or_replace {
        out.push_str("OR REPLACE ");
    }
    out.push_str("MATERIALIZED VIEW ");
    if view.if_not_exists {
        out.push_str("IF NOT EXISTS ");
    }
    out.push_str(&quote_qualified(view.object.database.as_deref(), &view.object.name));
    out.push_str(&on_cluster(&view.cluster));

    if let Some(target) = &view.target {
        out.push_str(&format!(" TO {}", quote_qualified(target.database.as_deref(), &target.name)));
    }
    out.push_str(&render_engine_clauses(&view.clauses));
    if let Some(refresh) = &view.refresh {
        out.push_str(&format!(" REFRESH {}", render_refresh_policy(refresh)));
    }
    if view.populate {
        out.push_str(" POPULATE");
    }
    out.push_str(&comment_clause(&view.comment));
    out.push_str(" AS ");
    out.push_str(&render_select(&view.query));
    out
}

pub fn render_view(view: &View) -> String {
    match view {
        View::Regular(v) => render_create_view(v),
        View::Materialized(v) => render_create_materialized_view(v),
    }
}

// ---- Named collections -----------------------------------------------

fn render_named_collection_entry(entry: &NamedCollectionEntry) -> String {
    let mut out = format!("{} = {}", entry.key, render_expr(&entry.value));
    if let Some(overridable) = entry.overridable {
        out.push_str(&format!(" OVERRIDABLE = {}", if overridable { "true" } else { "false" }));
    }
    out
}

pub fn render_create_named_collection(nc: &NamedCollection) -> String {
    let mut out = "CREATE ".to_string();
    if nc.or_replace {
        out.push_str("OR REPLACE ");
    }
    out.push_str("NAMED COLLECTION ");
    out.push_str(&quote_ident(&nc.name));
    out.push_str(&on_cluster(&nc.cluster));
    if !nc.entries.is_empty() {
        let rendered: Vec<String> = nc.entries.iter().map(render_named_collection_entry).collect();
        out.push_str(" AS ");
        out.push_str(&rendered.join(", "));
    }
    out.push_str(&comment_clause(&nc.comment));
    out
}

pub fn render_alter_named_collection(stmt: &AlterNamedCollection) -> String {
    let mut out = format!("ALTER NAMED COLLECTION {}{}", quote_ident(&stmt.name), on_cluster(&stmt.cluster));
    if !stmt.set_entries.is_empty() {
        let rendered: Vec<String> = stmt.set_entries.iter().map(render_named_collection_entry).collect();
        out.push_str(&format!(" SET {}", rendered.join(", ")));
    }
    if !stmt.delete_keys.is_empty() {
        out.push_str(&format!(" DELETE {}", stmt.delete_keys.join(", ")));
    }
    out
}

// ---- Roles / grants / functions ---------------------------------------

pub fn render_create_role(role: &Role) -> String {
    let mut out = format!("CREATE ROLE {}{}", quote_ident(&role.name), on_cluster(&role.cluster));
    out.push_str(&settings_clause(&role.settings));
    out
}

pub fn render_alter_role(stmt: &AlterRole) -> String {
    let mut out = format!("ALTER ROLE {}{}", quote_ident(&stmt.name), on_cluster(&stmt.cluster));
    out.push_str(&settings_clause(&stmt.settings));
    out
}

pub fn render_grant(stmt: &Grant) -> String {
    let mut out = format!(
        "GRANT{} {} ON {} TO {}",
        on_cluster(&stmt.cluster),
        stmt.privileges.join(", "),
        stmt.target.rendered(),
        quote_ident(&stmt.to)
    );
    if stmt.with_grant_option {
        out.push_str(" WITH GRANT OPTION");
    }
    out
}

pub fn render_revoke(stmt: &Revoke) -> String {
    format!(
        "REVOKE{} {} ON {} FROM {}",
        on_cluster(&stmt.cluster),
        stmt.privileges.join(", "),
        stmt.target.rendered(),
        quote_ident(&stmt.from)
    )
}

pub fn render_create_function(func: &Function) -> String {
    format!(
        "CREATE FUNCTION {}{} AS ({}) -> {}",
        quote_ident(&func.name),
        on_cluster(&func.cluster),
        func.args.join(", "),
        render_expr(&func.body)
    )
}

pub fn render_directive(directive: &Directive) -> String {
    format!("-- housekeeper:{} {}", directive.name, directive.rest)
}

// ---- ATTACH / DETACH / DROP / RENAME, database + object variants ------

pub fn render_attach_database(r: &SimpleDatabaseRef) -> String {
    format!("ATTACH DATABASE {}{}", quote_ident(&r.name), on_cluster(&r.cluster))
}

pub fn render_detach_database(r: &DetachDatabaseRef) -> String {
    let mut out = format!("DETACH DATABASE {}{}", quote_ident(&r.name), on_cluster(&r.cluster));
    if r.permanently {
        out.push_str(" PERMANENTLY");
    }
    if r.sync {
        out.push_str(" SYNC");
    }
    out
}

pub fn render_drop_database(r: &DropDatabaseRef) -> String {
    let mut out = "DROP DATABASE".to_string();
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", quote_ident(&r.name), on_cluster(&r.cluster)));
    if r.sync {
        out.push_str(" SYNC");
    }
    out
}

pub fn render_rename_database(r: &RenameDatabaseRef) -> String {
    format!("RENAME DATABASE {} TO {}{}", quote_ident(&r.from), quote_ident(&r.to), on_cluster(&r.cluster))
}

fn render_object_ref(r: &ObjectRef) -> String {
    quote_qualified(r.database.as_deref(), &r.name)
}

pub fn render_attach_object(kind: &str, r: &SimpleObjectRef) -> String {
    let mut out = format!("ATTACH {kind}");
    if r.if_not_exists {
        out.push_str(" IF NOT EXISTS");
    }
    out.push_str(&format!(" {}{}", render_object_ref(&r.object), on_cluster(&r.cluster)));
    out
}

pub fn render_detach_object(kind: &str, r: &DetachObjectRef) -> String {
    let mut out = format!("DETACH {kind}");
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", render_object_ref(&r.object), on_cluster(&r.cluster)));
    if r.permanently {
        out.push_str(" PERMANENTLY");
    }
    if r.sync {
        out.push_str(" SYNC");
    }
    out
}

pub fn render_drop_object(kind: &str, r: &DropObjectRef) -> String {
    let mut out = format!("DROP {kind}");
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", render_object_ref(&r.object), on_cluster(&r.cluster)));
    if r.sync {
        out.push_str(" SYNC");
    }
    out
}

pub fn render_rename_object(kind: &str, r: &RenameObjectRef) -> String {
    format!(
        "RENAME {kind} {} TO {}{}",
        render_object_ref(&r.from),
        render_object_ref(&r.to),
        on_cluster(&r.cluster)
    )
}

pub fn render_drop_role(r: &DropDatabaseRef) -> String {
    let mut out = "DROP ROLE".to_string();
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", quote_ident(&r.name), on_cluster(&r.cluster)));
    out
}

pub fn render_rename_role(r: &RenameDatabaseRef) -> String {
    format!("RENAME ROLE {} TO {}{}", quote_ident(&r.from), quote_ident(&r.to), on_cluster(&r.cluster))
}

pub fn render_drop_function(r: &DropDatabaseRef) -> String {
    let mut out = "DROP FUNCTION".to_string();
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", quote_ident(&r.name), on_cluster(&r.cluster)));
    out
}

pub fn render_drop_named_collection(r: &DropObjectRef) -> String {
    let mut out = "DROP NAMED COLLECTION".to_string();
    if r.if_exists {
        out.push_str(" IF EXISTS");
    }
    out.push_str(&format!(" {}{}", quote_ident(&r.object.name), on_cluster(&r.cluster)));
    out
}
