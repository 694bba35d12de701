use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

use super::rename::find_rename_pairs;
use super::system::guard_database;

fn equal_ignoring_name(a: &Database, b: &Database) -> bool {
    let mut a2 = a.clone();
    let mut b2 = b.clone();
    a2.name.clear();
    b2.name.clear();
    a2 == b2
}

pub fn diff_databases(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.databases_sorted();
    let tgt = target.databases_sorted();

    for d in cur.iter().chain(tgt.iter()) {
        guard_database(&d.name)?;
    }

    let cur_only: Vec<&Database> = cur
        .iter()
        .copied()
        .filter(|d| target.database(&d.name).is_none())
        .collect();
    let tgt_only: Vec<&Database> = tgt
        .iter()
        .copied()
        .filter(|d| current.database(&d.name).is_none())
        .collect();

    let pairs = find_rename_pairs(&cur_only, &tgt_only, |a, b| equal_ignoring_name(a, b), |_, _| true);
    let matched_cur: std::collections::HashSet<usize> = pairs.iter().map(|(oi, _)| *oi).collect();
    let matched_tgt: std::collections::HashSet<usize> = pairs.iter().map(|(_, ni)| *ni).collect();

    let mut creates = Vec::new();
    let mut alters = Vec::new();
    let mut renames = Vec::new();
    let mut drops = Vec::new();

    for (oi, ni) in &pairs {
        let old = cur_only[*oi];
        let new = tgt_only[*ni];
        renames.push((
            Statement::RenameDatabase(RenameDatabaseRef {
                from: old.name.clone(),
                to: new.name.clone(),
                cluster: new.cluster.clone(),
            }),
            Statement::RenameDatabase(RenameDatabaseRef {
                from: new.name.clone(),
                to: old.name.clone(),
                cluster: old.cluster.clone(),
            }),
        ));
    }

    for (i, old) in cur_only.iter().enumerate() {
        if matched_cur.contains(&i) {
            continue;
        }
        drops.push((
            Statement::DropDatabase(DropDatabaseRef {
                name: old.name.clone(),
                cluster: old.cluster.clone(),
                if_exists: true,
                sync: true,
            }),
            Statement::CreateDatabase(CreateDatabase { database: (*old).clone() }),
        ));
    }

    for (i, new) in tgt_only.iter().enumerate() {
        if matched_tgt.contains(&i) {
            continue;
        }
        creates.push((
            Statement::CreateDatabase(CreateDatabase { database: (*new).clone() }),
            Statement::DropDatabase(DropDatabaseRef {
                name: new.name.clone(),
                cluster: new.cluster.clone(),
                if_exists: true,
                sync: false,
            }),
        ));
    }

    for old in &cur {
        let Some(new) = target.database(&old.name) else {
            continue;
        };
        if old.engine != new.engine {
            return Err(RefusedChange::EngineChange {
                object: old.name.clone(),
                from: old.engine.as_ref().map(|e| e.name.clone()).unwrap_or_default(),
                to: new.engine.as_ref().map(|e| e.name.clone()).unwrap_or_default(),
            });
        }
        if old.cluster != new.cluster {
            return Err(RefusedChange::ClusterChange {
                object: old.name.clone(),
                from: old.cluster.clone(),
                to: new.cluster.clone(),
            });
        }
        if old.comment != new.comment {
            alters.push((
                Statement::AlterDatabase(AlterDatabase {
                    name: old.name.clone(),
                    cluster: old.cluster.clone(),
                    comment: new.comment.clone().unwrap_or_default(),
                }),
                Statement::AlterDatabase(AlterDatabase {
                    name: old.name.clone(),
                    cluster: old.cluster.clone(),
                    comment: old.comment.clone().unwrap_or_default(),
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
