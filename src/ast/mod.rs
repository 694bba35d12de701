//! The typed abstract representation every supported DDL/SELECT statement
//! parses into (spec.md §3 "Statement").

pub mod ddl;
pub mod expr;
pub mod select;
pub mod types;

pub use ddl::*;
pub use expr::*;
pub use select::*;
pub use types::*;

/// A tagged variant over every statement form this grammar accepts.
/// Parser, differ and renderer each exhaustively match over this enum;
/// adding a variant without updating all three is a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateDatabase(CreateDatabase),
    AlterDatabase(AlterDatabase),
    AttachDatabase(SimpleDatabaseRef),
    DetachDatabase(DetachDatabaseRef),
    DropDatabase(DropDatabaseRef),
    RenameDatabase(RenameDatabaseRef),

    CreateTable(Table),
    AlterTable(AlterTable),
    AttachTable(SimpleObjectRef),
    DetachTable(DetachObjectRef),
    DropTable(DropObjectRef),
    RenameTable(RenameObjectRef),

    CreateDictionary(Dictionary),
    AttachDictionary(SimpleObjectRef),
    DetachDictionary(DetachObjectRef),
    DropDictionary(DropObjectRef),
    RenameDictionary(RenameObjectRef),

    CreateView(RegularView),
    CreateMaterializedView(MaterializedView),
    AttachView(SimpleObjectRef),
    DetachView(DetachObjectRef),
    DropView(DropObjectRef),
    RenameView(RenameObjectRef),

    CreateNamedCollection(NamedCollection),
    AlterNamedCollection(AlterNamedCollection),
    DropNamedCollection(DropObjectRef),

    CreateRole(Role),
    AlterRole(AlterRole),
    DropRole(DropDatabaseRef),
    RenameRole(RenameDatabaseRef),

    Grant(Grant),
    Revoke(Revoke),

    CreateFunction(Function),
    DropFunction(DropDatabaseRef),

    Select(SelectStatement),
    Comment(Directive),
}

impl Statement {
    /// A short label used by error messages and logging; never used for
    /// anything semantic.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Statement::CreateDatabase(_) => "CREATE DATABASE",
            Statement::AlterDatabase(_) => "ALTER DATABASE",
            Statement::AttachDatabase(_) => "ATTACH DATABASE",
            Statement::DetachDatabase(_) => "DETACH DATABASE",
            Statement::DropDatabase(_) => "DROP DATABASE",
            Statement::RenameDatabase(_) => "RENAME DATABASE",
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::AlterTable(_) => "ALTER TABLE",
            Statement::AttachTable(_) => "ATTACH TABLE",
            Statement::DetachTable(_) => "DETACH TABLE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::RenameTable(_) => "RENAME TABLE",
            Statement::CreateDictionary(_) => "CREATE DICTIONARY",
            Statement::AttachDictionary(_) => "ATTACH DICTIONARY",
            Statement::DetachDictionary(_) => "DETACH DICTIONARY",
            Statement::DropDictionary(_) => "DROP DICTIONARY",
            Statement::RenameDictionary(_) => "RENAME DICTIONARY",
            Statement::CreateView(_) => "CREATE VIEW",
            Statement::CreateMaterializedView(_) => "CREATE MATERIALIZED VIEW",
            Statement::AttachView(_) => "ATTACH VIEW",
            Statement::DetachView(_) => "DETACH VIEW",
            Statement::DropView(_) => "DROP VIEW",
            Statement::RenameView(_) => "RENAME VIEW",
            Statement::CreateNamedCollection(_) => "CREATE NAMED COLLECTION",
            Statement::AlterNamedCollection(_) => "ALTER NAMED COLLECTION",
            Statement::DropNamedCollection(_) => "DROP NAMED COLLECTION",
            Statement::CreateRole(_) => "CREATE ROLE",
            Statement::AlterRole(_) => "ALTER ROLE",
            Statement::DropRole(_) => "DROP ROLE",
            Statement::RenameRole(_) => "RENAME ROLE",
            Statement::Grant(_) => "GRANT",
            Statement::Revoke(_) => "REVOKE",
            Statement::CreateFunction(_) => "CREATE FUNCTION",
            Statement::DropFunction(_) => "DROP FUNCTION",
            Statement::Select(_) => "SELECT",
            Statement::Comment(_) => "-- comment",
        }
    }

    /// Statements that carry no executable DDL (directive comments) are
    /// skipped for execution but still counted as applied (spec.md §4.5).
    pub fn is_comment_only(&self) -> bool {
        matches!(self, Statement::Comment(_))
    }
}
