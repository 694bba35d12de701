//! Normalised in-memory schema representation (spec.md §3 "Schema").
//!
//! A [`Schema`] is the ordered statement vector a file parses into, plus
//! four key-indexed views built by folding those statements in order.
//! The fold lets a schema be built either from a purely declarative file
//! (all `CREATE ...`) or from a sequence of migrations that mix
//! CREATE/ALTER/DROP/RENAME — both the differ's "current" and "target"
//! inputs are just `Schema` values, built the same way.

use std::collections::HashMap;

use crate::ast::*;

/// `(database, name)`, keyed with the default-database sentinel folded to
/// `None` (spec.md §3: "Default database is a distinguished sentinel,
/// rendered empty when absent").
pub type ObjectKey = (Option<String>, String);

fn sort_key(database: Option<&str>, name: &str) -> (String, String) {
    (database.unwrap_or("").to_string(), name.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    statements: Vec<Statement>,
    databases: HashMap<String, Database>,
    tables: HashMap<ObjectKey, Table>,
    dictionaries: HashMap<ObjectKey, Dictionary>,
    views: HashMap<ObjectKey, View>,
    named_collections: HashMap<String, NamedCollection>,
    roles: HashMap<String, Role>,
    grants: Vec<Grant>,
    functions: HashMap<String, Function>,
}

impl Schema {
    pub fn from_statements(statements: Vec<Statement>) -> Schema {
        let mut schema = Schema::default();
        for stmt in &statements {
            schema.apply(stmt.clone());
        }
        schema.statements = statements;
        schema
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    pub fn databases_sorted(&self) -> Vec<&Database> {
        let mut v: Vec<&Database> = self.databases.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    pub fn table(&self, database: Option<&str>, name: &str) -> Option<&Table> {
        self.tables.get(&key_of(database, name))
    }

    pub fn tables_sorted(&self) -> Vec<&Table> {
        let mut v: Vec<&Table> = self.tables.values().collect();
        v.sort_by(|a, b| sort_key(a.database(), a.name()).cmp(&sort_key(b.database(), b.name())));
        v
    }

    pub fn dictionary(&self, database: Option<&str>, name: &str) -> Option<&Dictionary> {
        self.dictionaries.get(&key_of(database, name))
    }

    pub fn dictionaries_sorted(&self) -> Vec<&Dictionary> {
        let mut v: Vec<&Dictionary> = self.dictionaries.values().collect();
        v.sort_by(|a, b| sort_key(a.database(), a.name()).cmp(&sort_key(b.database(), b.name())));
        v
    }

    pub fn view(&self, database: Option<&str>, name: &str) -> Option<&View> {
        self.views.get(&key_of(database, name))
    }

    pub fn views_sorted(&self) -> Vec<&View> {
        let mut v: Vec<&View> = self.views.values().collect();
        v.sort_by(|a, b| sort_key(a.database(), a.name()).cmp(&sort_key(b.database(), b.name())));
        v
    }

    pub fn named_collection(&self, name: &str) -> Option<&NamedCollection> {
        self.named_collections.get(name)
    }

    pub fn named_collections_sorted(&self) -> Vec<&NamedCollection> {
        let mut v: Vec<&NamedCollection> = self.named_collections.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn roles_sorted(&self) -> Vec<&Role> {
        let mut v: Vec<&Role> = self.roles.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn functions_sorted(&self) -> Vec<&Function> {
        let mut v: Vec<&Function> = self.functions.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    fn apply(&mut self, stmt: Statement) {
        match stmt {
            Statement::CreateDatabase(s) => {
                self.databases.insert(s.database.name.clone(), s.database);
            }
            Statement::AlterDatabase(s) => {
                if let Some(db) = self.databases.get_mut(&s.name) {
                    db.comment = Some(s.comment);
                }
            }
            Statement::DropDatabase(s) => {
                self.databases.remove(&s.name);
            }
            Statement::RenameDatabase(s) => {
                if let Some(mut db) = self.databases.remove(&s.from) {
                    db.name = s.to.clone();
                    self.databases.insert(s.to, db);
                }
            }
            Statement::AttachDatabase(_) | Statement::DetachDatabase(_) => {}

            Statement::CreateTable(t) => {
                let key = key_of(t.database(), t.name());
                self.tables.insert(key, t);
            }
            Statement::AlterTable(a) => {
                let key = key_of(a.object.database.as_deref(), &a.object.name);
                if let Some(table) = self.tables.get_mut(&key) {
                    for op in a.ops {
                        apply_alter_table_op(table, op);
                    }
                }
            }
            Statement::DropTable(d) => {
                self.tables.remove(&key_of(d.object.database.as_deref(), &d.object.name));
            }
            Statement::RenameTable(r) => {
                let from = key_of(r.from.database.as_deref(), &r.from.name);
                if let Some(mut table) = self.tables.remove(&from) {
                    table.object = r.to.clone();
                    self.tables
                        .insert(key_of(r.to.database.as_deref(), &r.to.name), table);
                }
            }
            Statement::AttachTable(_) | Statement::DetachTable(_) => {}

            Statement::CreateDictionary(d) => {
                let key = key_of(d.database(), d.name());
                self.dictionaries.insert(key, d);
            }
            Statement::DropDictionary(d) => {
                self.dictionaries
                    .remove(&key_of(d.object.database.as_deref(), &d.object.name));
            }
            Statement::RenameDictionary(r) => {
                let from = key_of(r.from.database.as_deref(), &r.from.name);
                if let Some(mut dict) = self.dictionaries.remove(&from) {
                    dict.object = r.to.clone();
                    self.dictionaries
                        .insert(key_of(r.to.database.as_deref(), &r.to.name), dict);
                }
            }
            Statement::AttachDictionary(_) | Statement::DetachDictionary(_) => {}

            Statement::CreateView(v) => {
                let key = key_of(v.object.database.as_deref(), &v.object.name);
                self.views.insert(key, View::Regular(v));
            }
            Statement::CreateMaterializedView(v) => {
                let key = key_of(v.object.database.as_deref(), &v.object.name);
                self.views.insert(key, View::Materialized(v));
            }
            Statement::DropView(d) => {
                self.views
                    .remove(&key_of(d.object.database.as_deref(), &d.object.name));
            }
            Statement::RenameView(r) => {
                let from = key_of(r.from.database.as_deref(), &r.from.name);
                if let Some(mut view) = self.views.remove(&from) {
                    match &mut view {
                        View::Regular(v) => v.object = r.to.clone(),
                        View::Materialized(v) => v.object = r.to.clone(),
                    }
                    self.views
                        .insert(key_of(r.to.database.as_deref(), &r.to.name), view);
                }
            }
            Statement::AttachView(_) | Statement::DetachView(_) => {}

            Statement::CreateNamedCollection(c) => {
                self.named_collections.insert(c.name.clone(), c);
            }
            Statement::AlterNamedCollection(a) => {
                if let Some(collection) = self.named_collections.get_mut(&a.name) {
                    let delete: std::collections::HashSet<_> = a.delete_keys.into_iter().collect();
                    collection.entries.retain(|e| !delete.contains(&e.key));
                    for entry in a.set_entries {
                        if let Some(existing) =
                            collection.entries.iter_mut().find(|e| e.key == entry.key)
                        {
                            *existing = entry;
                        } else {
                            collection.entries.push(entry);
                        }
                    }
                }
            }
            Statement::DropNamedCollection(d) => {
                self.named_collections.remove(&d.object.name);
            }

            Statement::CreateRole(r) => {
                self.roles.insert(r.name.clone(), r);
            }
            Statement::AlterRole(a) => {
                if let Some(role) = self.roles.get_mut(&a.name) {
                    role.settings = a.settings;
                }
            }
            Statement::DropRole(d) => {
                self.roles.remove(&d.name);
            }
            Statement::RenameRole(r) => {
                if let Some(mut role) = self.roles.remove(&r.from) {
                    role.name = r.to.clone();
                    self.roles.insert(r.to, role);
                }
            }

            Statement::Grant(g) => self.grants.push(g),
            Statement::Revoke(r) => self.grants.retain(|g| {
                !(g.to == r.from && g.target == r.target && g.privileges == r.privileges)
            }),

            Statement::CreateFunction(f) => {
                self.functions.insert(f.name.clone(), f);
            }
            Statement::DropFunction(d) => {
                self.functions.remove(&d.name);
            }

            Statement::Select(_) | Statement::Comment(_) => {}
        }
    }
}

fn key_of(database: Option<&str>, name: &str) -> ObjectKey {
    (database.map(str::to_string), name.to_string())
}

fn apply_alter_table_op(table: &mut Table, op: AlterTableOp) {
    match op {
        AlterTableOp::AddColumn { column, after, first, .. } => {
            if first {
                table.columns.insert(0, column);
            } else if let Some(after) = after {
                let idx = table
                    .columns
                    .iter()
                    .position(|c| c.name == after)
                    .map(|i| i + 1)
                    .unwrap_or(table.columns.len());
                table.columns.insert(idx, column);
            } else {
                table.columns.push(column);
            }
        }
        AlterTableOp::DropColumn { name, .. } => {
            table.columns.retain(|c| c.name != name);
        }
        AlterTableOp::ModifyColumn { column, .. } => {
            if let Some(existing) = table.columns.iter_mut().find(|c| c.name == column.name) {
                *existing = column;
            }
        }
        AlterTableOp::RenameColumn { from, to, .. } => {
            if let Some(existing) = table.columns.iter_mut().find(|c| c.name == from) {
                existing.name = to;
            }
        }
        AlterTableOp::ModifyComment(comment) => {
            table.comment = Some(comment);
        }
        AlterTableOp::ModifySetting(settings) => {
            for (k, v) in settings {
                if let Some(existing) = table.clauses.settings.iter_mut().find(|(ek, _)| *ek == k) {
                    existing.1 = v;
                } else {
                    table.clauses.settings.push((k, v));
                }
            }
        }
        AlterTableOp::ResetSetting(names) => {
            table.clauses.settings.retain(|(k, _)| !names.contains(k));
        }
        AlterTableOp::ModifyTtl(ttl) => {
            table.clauses.ttl = ttl;
        }
    }
}
