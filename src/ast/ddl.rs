//! Data-definition statement bodies: databases, tables, dictionaries,
//! views, named collections, roles, grants and functions.

use super::expr::{Expr, Identifier};
use super::select::SelectStatement;
use super::types::ColumnType;

/// `[db.]name`, the identity every table/dictionary/view carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectRef {
    pub database: Option<String>,
    pub name: String,
}

impl ObjectRef {
    pub fn new(database: Option<String>, name: impl Into<String>) -> Self {
        Self {
            database,
            name: name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        match &self.database {
            Some(db) => format!("{db}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKind {
    Default,
    Materialized,
    Ephemeral,
    Alias,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodecSpec {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub default_kind: Option<DefaultKind>,
    pub default_expr: Option<Expr>,
    pub codecs: Vec<CodecSpec>,
    pub ttl: Option<Expr>,
    pub comment: Option<String>,
}

impl Column {
    /// Columns are "modified" (spec.md §4.3) if any of these differ.
    pub fn differs_from(&self, other: &Column) -> bool {
        self.data_type != other.data_type
            || self.data_type.is_nullable() != other.data_type.is_nullable()
            || self.default_kind != other.default_kind
            || self.default_expr != other.default_expr
            || self.codecs != other.codecs
            || self.ttl != other.ttl
            || self.comment != other.comment
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub name: String,
    pub expression: Expr,
    pub index_type: String,
    pub type_args: Vec<Expr>,
    pub granularity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    pub name: String,
    pub expression: Expr,
}

/// `ENGINE = Name(params...)`. Behaviour that depends on *which* engine
/// this is (ORDER BY requirement, ALTER-ability) is a total function over
/// [`EngineFamily`] rather than a subclass hierarchy (spec.md §9).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSpec {
    pub name: String,
    pub params: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    MergeTree,
    Integration,
    Distributed,
    Other,
}

const INTEGRATION_ENGINES: &[&str] = &[
    "Kafka",
    "RabbitMQ",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "HDFS",
    "S3",
    "S3Queue",
    "ODBC",
    "JDBC",
    "NATS",
    "Redis",
    "ExternalDistributed",
    "Iceberg",
    "DeltaLake",
    "Hudi",
];

const MERGE_TREE_ENGINES: &[&str] = &[
    "MergeTree",
    "ReplacingMergeTree",
    "SummingMergeTree",
    "AggregatingMergeTree",
    "CollapsingMergeTree",
    "VersionedCollapsingMergeTree",
    "GraphiteMergeTree",
];

impl EngineSpec {
    /// Strips a leading `Replicated` wrapper, as in `ReplicatedMergeTree`
    /// or the (ClickHouse does not actually ship these, but the spec
    /// names the pattern explicitly) hypothetical `ReplicatedKafka`.
    fn base_name(&self) -> &str {
        self.name.strip_prefix("Replicated").unwrap_or(&self.name)
    }

    pub fn is_replicated(&self) -> bool {
        self.name.starts_with("Replicated") && self.name != "Replicated"
    }

    pub fn family(&self) -> EngineFamily {
        let base = self.base_name();
        if MERGE_TREE_ENGINES.contains(&base) {
            EngineFamily::MergeTree
        } else if INTEGRATION_ENGINES.contains(&base) {
            EngineFamily::Integration
        } else if base == "Distributed" {
            EngineFamily::Distributed
        } else {
            EngineFamily::Other
        }
    }

    pub fn requires_order_by(&self) -> bool {
        self.family() == EngineFamily::MergeTree
    }

    pub fn is_integration(&self) -> bool {
        self.family() == EngineFamily::Integration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TtlClause {
    pub expr: Expr,
    /// Everything after the expression, verbatim (`DELETE`, `TO DISK
    /// 'cold'`, `GROUP BY ...`); ClickHouse's TTL action grammar is wide
    /// and rarely exercised outside DELETE, so it is kept as text rather
    /// than modeled exhaustively.
    pub trailing: Option<String>,
}

/// The engine/ordering clause bag shared by `Table` and `MaterializedView`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableEngineClauses {
    pub engine: Option<EngineSpec>,
    pub order_by: Option<Expr>,
    pub partition_by: Option<Expr>,
    pub primary_key: Option<Expr>,
    pub sample_by: Option<Expr>,
    pub ttl: Vec<TtlClause>,
    pub settings: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(Identifier),
    TableFunction { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_not_exists: bool,
    pub or_replace: bool,
    pub columns: Vec<Column>,
    pub indexes: Vec<IndexDef>,
    pub constraints: Vec<ConstraintDef>,
    pub clauses: TableEngineClauses,
    pub comment: Option<String>,
    pub as_source: Option<TableSource>,
}

impl Table {
    pub fn database(&self) -> Option<&str> {
        self.object.database.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.object.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableOp {
    AddColumn {
        column: Column,
        if_not_exists: bool,
        after: Option<String>,
        first: bool,
    },
    DropColumn {
        name: String,
        if_exists: bool,
    },
    ModifyColumn {
        column: Column,
        if_exists: bool,
    },
    RenameColumn {
        from: String,
        to: String,
        if_exists: bool,
    },
    ModifyComment(String),
    ModifySetting(Vec<(String, String)>),
    ResetSetting(Vec<String>),
    ModifyTtl(Vec<TtlClause>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub ops: Vec<AlterTableOp>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleObjectRef {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetachObjectRef {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_exists: bool,
    pub permanently: bool,
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropObjectRef {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_exists: bool,
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenameObjectRef {
    pub from: ObjectRef,
    pub to: ObjectRef,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    pub name: String,
    pub cluster: Option<String>,
    pub engine: Option<EngineSpec>,
    pub comment: Option<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabase {
    pub database: Database,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterDatabase {
    pub name: String,
    pub cluster: Option<String>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleDatabaseRef {
    pub name: String,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetachDatabaseRef {
    pub name: String,
    pub cluster: Option<String>,
    pub permanently: bool,
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropDatabaseRef {
    pub name: String,
    pub cluster: Option<String>,
    pub if_exists: bool,
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenameDatabaseRef {
    pub from: String,
    pub to: String,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryColumn {
    pub name: String,
    pub data_type: ColumnType,
    pub is_object_id: bool,
    pub hierarchical: bool,
    pub injective: bool,
    pub default_expr: Option<Expr>,
    pub expression_expr: Option<Expr>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceArgValue {
    Expr(Expr),
    Nested(Box<DictionarySource>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: SourceArgValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionarySource {
    pub name: String,
    pub args: Vec<NamedArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryLayout {
    pub name: String,
    pub params: Vec<(String, Expr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryLifetime {
    Single(Expr),
    Range { min: Expr, max: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_not_exists: bool,
    pub or_replace: bool,
    pub columns: Vec<DictionaryColumn>,
    pub primary_key: Vec<String>,
    pub source: DictionarySource,
    pub layout: DictionaryLayout,
    pub lifetime: Option<DictionaryLifetime>,
    pub settings: Vec<(String, String)>,
    pub comment: Option<String>,
}

impl Dictionary {
    pub fn database(&self) -> Option<&str> {
        self.object.database.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.object.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegularView {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_not_exists: bool,
    pub or_replace: bool,
    pub query: SelectStatement,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPolicy {
    pub every: (u64, RefreshUnit),
    pub offset: Option<(u64, RefreshUnit)>,
    pub append_to: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedView {
    pub object: ObjectRef,
    pub cluster: Option<String>,
    pub if_not_exists: bool,
    pub or_replace: bool,
    pub target: Option<ObjectRef>,
    pub clauses: TableEngineClauses,
    pub populate: bool,
    pub refresh: Option<RefreshPolicy>,
    pub query: SelectStatement,
    pub comment: Option<String>,
}

impl MaterializedView {
    pub fn database(&self) -> Option<&str> {
        self.object.database.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.object.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Regular(RegularView),
    Materialized(MaterializedView),
}

impl View {
    pub fn database(&self) -> Option<&str> {
        match self {
            View::Regular(v) => v.object.database.as_deref(),
            View::Materialized(v) => v.object.database.as_deref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            View::Regular(v) => &v.object.name,
            View::Materialized(v) => &v.object.name,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, View::Materialized(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedCollectionEntry {
    pub key: String,
    pub value: Expr,
    pub overridable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedCollection {
    pub name: String,
    pub cluster: Option<String>,
    pub or_replace: bool,
    pub entries: Vec<NamedCollectionEntry>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterNamedCollection {
    pub name: String,
    pub cluster: Option<String>,
    pub set_entries: Vec<NamedCollectionEntry>,
    pub delete_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Role {
    pub name: String,
    pub cluster: Option<String>,
    pub settings: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterRole {
    pub name: String,
    pub cluster: Option<String>,
    pub settings: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantTarget {
    pub database: String,
    pub table: Option<String>,
}

impl GrantTarget {
    pub fn rendered(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", self.database, t),
            None => format!("{}.*", self.database),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub privileges: Vec<String>,
    pub target: GrantTarget,
    pub to: String,
    pub with_grant_option: bool,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Revoke {
    pub privileges: Vec<String>,
    pub target: GrantTarget,
    pub from: String,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub cluster: Option<String>,
    pub args: Vec<String>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub rest: String,
}
