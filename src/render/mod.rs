//! Canonical SQL renderer (spec.md §4.2).
//!
//! `render_statement` is the single source of truth for "what a statement
//! looks like on disk": the differ renders every generated migration
//! statement through here, and the round-trip property
//! `parse(render(s)) == s` is the renderer's contract with the parser.

mod ddl;
mod expr;
mod ident;
mod select;
mod types;

pub use ident::{quote_ident, quote_qualified};

use crate::ast::Statement;

pub fn render_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::CreateDatabase(s) => ddl::render_create_database(s),
        Statement::AlterDatabase(s) => ddl::render_alter_database(s),
        Statement::AttachDatabase(s) => ddl::render_attach_database(s),
        Statement::DetachDatabase(s) => ddl::render_detach_database(s),
        Statement::DropDatabase(s) => ddl::render_drop_database(s),
        Statement::RenameDatabase(s) => ddl::render_rename_database(s),

        Statement::CreateTable(s) => ddl::render_create_table(s),
        Statement::AlterTable(s) => ddl::render_alter_table(s),
        Statement::AttachTable(s) => ddl::render_attach_object("TABLE", s),
        Statement::DetachTable(s) => ddl::render_detach_object("TABLE", s),
        Statement::DropTable(s) => ddl::render_drop_object("TABLE", s),
        Statement::RenameTable(s) => ddl::render_rename_object("TABLE", s),

        Statement::CreateDictionary(s) => ddl::render_create_dictionary(s),
        Statement::AttachDictionary(s) => ddl::render_attach_object("DICTIONARY", s),
        Statement::DetachDictionary(s) => ddl::render_detach_object("DICTIONARY", s),
        Statement::DropDictionary(s) => ddl::render_drop_object("DICTIONARY", s),
        Statement::RenameDictionary(s) => ddl::render_rename_object("DICTIONARY", s),

        Statement::CreateView(s) => ddl::render_create_view(s),
        Statement::CreateMaterializedView(s) => ddl::render_create_materialized_view(s),
        Statement::AttachView(s) => ddl::render_attach_object("VIEW", s),
        Statement::DetachView(s) => ddl::render_detach_object("VIEW", s),
        Statement::DropView(s) => ddl::render_drop_object("VIEW", s),
        Statement::RenameView(s) => ddl::render_rename_object("TABLE", s),

        Statement::CreateNamedCollection(s) => ddl::render_create_named_collection(s),
        Statement::AlterNamedCollection(s) => ddl::render_alter_named_collection(s),
        Statement::DropNamedCollection(s) => ddl::render_drop_named_collection(s),

        Statement::CreateRole(s) => ddl::render_create_role(s),
        Statement::AlterRole(s) => ddl::render_alter_role(s),
        Statement::DropRole(s) => ddl::render_drop_role(s),
        Statement::RenameRole(s) => ddl::render_rename_role(s),

        Statement::Grant(s) => ddl::render_grant(s),
        Statement::Revoke(s) => ddl::render_revoke(s),

        Statement::CreateFunction(s) => ddl::render_create_function(s),
        Statement::DropFunction(s) => ddl::render_drop_function(s),

        Statement::Select(s) => select::render_select(s),
        Statement::Comment(s) => ddl::render_directive(s),
    }
}

/// Renders a statement followed by the statement terminator, the exact
/// form a statement is persisted to a migration file as.
pub fn render_statement_terminated(stmt: &Statement) -> String {
    format!("{};\n", render_statement(stmt))
}

pub fn render_schema(schema: &crate::model::Schema) -> String {
    schema
        .statements()
        .iter()
        .map(render_statement_terminated)
        .collect::<Vec<_>>()
        .join("\n")
}
