//! Table differ (spec.md §4.3 "Table").
//!
//! Engine/cluster changes are refused outright. Column changes become a
//! single `ALTER TABLE` combining MODIFY/ADD/DROP/RENAME sub-operations,
//! in that fixed order. Integration engines (Kafka, MySQL, S3, ...) can't
//! be `ALTER`ed in ClickHouse, so any difference on one is DROP+CREATE.

use std::collections::HashSet;

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

use super::rename::find_rename_pairs;
use super::system::guard_object;

fn equal_ignoring_identity(a: &Table, b: &Table) -> bool {
    let mut a2 = a.clone();
    let mut b2 = b.clone();
    a2.object = ObjectRef::default();
    b2.object = ObjectRef::default();
    a2.if_not_exists = false;
    b2.if_not_exists = false;
    a2.or_replace = false;
    b2.or_replace = false;
    a2 == b2
}

fn same_qualifier(a: &Table, b: &Table) -> bool {
    a.database() == b.database()
}

fn create_stmt(table: &Table) -> Statement {
    Statement::CreateTable(table.clone())
}

fn drop_stmt(table: &Table) -> Statement {
    Statement::DropTable(DropObjectRef {
        object: table.object.clone(),
        cluster: table.cluster.clone(),
        if_exists: true,
        sync: false,
    })
}

fn column_alter_ops(old: &Table, new: &Table) -> (Vec<AlterTableOp>, Vec<AlterTableOp>) {
    let old_set: HashSet<&str> = old.columns.iter().map(|c| c.name.as_str()).collect();
    let new_set: HashSet<&str> = new.columns.iter().map(|c| c.name.as_str()).collect();

    let mut up_modify = Vec::new();
    let mut down_modify = Vec::new();
    let mut up_add = Vec::new();
    let mut down_drop_for_add = Vec::new();
    let mut up_drop = Vec::new();
    let mut down_add_for_drop = Vec::new();

    for new_col in &new.columns {
        if let Some(old_col) = old.columns.iter().find(|c| c.name == new_col.name) {
            if old_col.differs_from(new_col) {
                up_modify.push(AlterTableOp::ModifyColumn {
                    column: new_col.clone(),
                    if_exists: true,
                });
                down_modify.push(AlterTableOp::ModifyColumn {
                    column: old_col.clone(),
                    if_exists: true,
                });
            }
        }
    }

    for (i, new_col) in new.columns.iter().enumerate() {
        if !old_set.contains(new_col.name.as_str()) {
            let after = if i == 0 {
                None
            } else {
                Some(new.columns[i - 1].name.clone())
            };
            up_add.push(AlterTableOp::AddColumn {
                column: new_col.clone(),
                if_not_exists: true,
                after,
                first: i == 0,
            });
            down_drop_for_add.push(AlterTableOp::DropColumn {
                name: new_col.name.clone(),
                if_exists: true,
            });
        }
    }

    for (i, old_col) in old.columns.iter().enumerate() {
        if !new_set.contains(old_col.name.as_str()) {
            up_drop.push(AlterTableOp::DropColumn {
                name: old_col.name.clone(),
                if_exists: true,
            });
            let after = if i == 0 {
                None
            } else {
                Some(old.columns[i - 1].name.clone())
            };
            down_add_for_drop.push(AlterTableOp::AddColumn {
                column: old_col.clone(),
                if_not_exists: true,
                after,
                first: i == 0,
            });
        }
    }

    // Ordering within the ALTER: {MODIFY, ADD, DROP, RENAME} (spec.md §4.3).
    let mut up = up_modify;
    up.extend(up_add);
    up.extend(up_drop);

    let mut down = down_modify;
    down.extend(down_add_for_drop);
    down.extend(down_drop_for_add);

    (up, down)
}

pub fn diff_tables(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.tables_sorted();
    let tgt = target.tables_sorted();

    for t in cur.iter().chain(tgt.iter()) {
        guard_object(t.database(), t.name())?;
    }

    let cur_only: Vec<&Table> = cur
        .iter()
        .copied()
        .filter(|t| target.table(t.database(), t.name()).is_none())
        .collect();
    let tgt_only: Vec<&Table> = tgt
        .iter()
        .copied()
        .filter(|t| current.table(t.database(), t.name()).is_none())
        .collect();

    let pairs = find_rename_pairs(&cur_only, &tgt_only, equal_ignoring_identity, same_qualifier);
    let matched_cur: HashSet<usize> = pairs.iter().map(|(oi, _)| *oi).collect();
    let matched_tgt: HashSet<usize> = pairs.iter().map(|(_, ni)| *ni).collect();

    let mut creates = Vec::new();
    let mut alters = Vec::new();
    let mut renames = Vec::new();
    let mut drops = Vec::new();

    for (oi, ni) in &pairs {
        let old = cur_only[*oi];
        let new = tgt_only[*ni];
        renames.push((
            Statement::RenameTable(RenameObjectRef {
                from: old.object.clone(),
                to: new.object.clone(),
                cluster: new.cluster.clone(),
            }),
            Statement::RenameTable(RenameObjectRef {
                from: new.object.clone(),
                to: old.object.clone(),
                cluster: old.cluster.clone(),
            }),
        ));
    }

    for (i, old) in cur_only.iter().enumerate() {
        if matched_cur.contains(&i) {
            continue;
        }
        drops.push((drop_stmt(old), create_stmt(old)));
    }

    for (i, new) in tgt_only.iter().enumerate() {
        if matched_tgt.contains(&i) {
            continue;
        }
        creates.push((create_stmt(new), drop_stmt(new)));
    }

    for old in &cur {
        let Some(new) = target.table(old.database(), old.name()) else {
            continue;
        };
        if old.clauses.engine != new.clauses.engine {
            return Err(RefusedChange::EngineChange {
                object: old.object.qualified(),
                from: old
                    .clauses
                    .engine
                    .as_ref()
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                to: new
                    .clauses
                    .engine
                    .as_ref()
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
            });
        }
        if old.cluster != new.cluster {
            return Err(RefusedChange::ClusterChange {
                object: old.object.qualified(),
                from: old.cluster.clone(),
                to: new.cluster.clone(),
            });
        }

        let is_integration = old
            .clauses
            .engine
            .as_ref()
            .map(|e| e.is_integration())
            .unwrap_or(false);

        if old == new {
            continue;
        }

        if is_integration {
            alters.push((drop_stmt(old), create_stmt(old)));
            alters.push((create_stmt(new), drop_stmt(new)));
            continue;
        }

        if old.clauses.order_by != new.clauses.order_by
            || old.clauses.partition_by != new.clauses.partition_by
            || old.clauses.primary_key != new.clauses.primary_key
            || old.clauses.sample_by != new.clauses.sample_by
        {
            return Err(RefusedChange::UnsupportedAlter {
                object: old.object.qualified(),
                reason: "ORDER BY / PARTITION BY / PRIMARY KEY / SAMPLE BY changes have no ALTER form"
                    .to_string(),
            });
        }

        let (col_up, col_down) = column_alter_ops(old, new);
        if !col_up.is_empty() {
            alters.push((
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: col_up,
                }),
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: col_down,
                }),
            ));
        }

        if old.comment != new.comment {
            alters.push((
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifyComment(
                        new.comment.clone().unwrap_or_default(),
                    )],
                }),
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifyComment(
                        old.comment.clone().unwrap_or_default(),
                    )],
                }),
            ));
        }

        if old.clauses.ttl != new.clauses.ttl {
            alters.push((
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifyTtl(new.clauses.ttl.clone())],
                }),
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifyTtl(old.clauses.ttl.clone())],
                }),
            ));
        }

        if old.clauses.settings != new.clauses.settings {
            alters.push((
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifySetting(new.clauses.settings.clone())],
                }),
                Statement::AlterTable(AlterTable {
                    object: old.object.clone(),
                    cluster: old.cluster.clone(),
                    ops: vec![AlterTableOp::ModifySetting(old.clauses.settings.clone())],
                }),
            ));
        }
    }

    for (u, d) in creates.into_iter().chain(alters).chain(renames).chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
