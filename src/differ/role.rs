//! Role differ (spec.md §4.3 "Named collection / Role / Function").
//!
//! Roles have a real `RENAME ROLE` in the grammar, so rename detection
//! applies the same way it does for databases. Any other content change
//! (settings) is `CREATE OR REPLACE`-shaped: ClickHouse has no `CREATE OR
//! REPLACE ROLE`, so a settings-only change is expressed as `ALTER ROLE`.

use std::collections::HashSet;

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

use super::rename::find_rename_pairs;

fn equal_ignoring_identity(a: &Role, b: &Role) -> bool {
    a.settings == b.settings
}

fn create_stmt(role: &Role) -> Statement {
    Statement::CreateRole(role.clone())
}

fn drop_stmt(role: &Role) -> Statement {
    Statement::DropRole(DropDatabaseRef {
        name: role.name.clone(),
        cluster: role.cluster.clone(),
        if_exists: true,
        sync: false,
    })
}

pub fn diff_roles(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.roles_sorted();
    let tgt = target.roles_sorted();

    let cur_only: Vec<&Role> = cur
        .iter()
        .copied()
        .filter(|r| target.role(&r.name).is_none())
        .collect();
    let tgt_only: Vec<&Role> = tgt
        .iter()
        .copied()
        .filter(|r| current.role(&r.name).is_none())
        .collect();

    let pairs = find_rename_pairs(&cur_only, &tgt_only, equal_ignoring_identity, |_, _| true);
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
            Statement::RenameRole(RenameDatabaseRef {
                from: old.name.clone(),
                to: new.name.clone(),
                cluster: new.cluster.clone(),
            }),
            Statement::RenameRole(RenameDatabaseRef {
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
        drops.push((drop_stmt(old), create_stmt(old)));
    }

    for (i, new) in tgt_only.iter().enumerate() {
        if matched_tgt.contains(&i) {
            continue;
        }
        creates.push((create_stmt(new), drop_stmt(new)));
    }

    for old in &cur {
        let Some(new) = target.role(&old.name) else {
            continue;
        };
        if old.settings != new.settings {
            alters.push((
                Statement::AlterRole(AlterRole {
                    name: old.name.clone(),
                    cluster: old.cluster.clone(),
                    settings: new.settings.clone(),
                }),
                Statement::AlterRole(AlterRole {
                    name: old.name.clone(),
                    cluster: old.cluster.clone(),
                    settings: old.settings.clone(),
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
