//! Dictionary differ (spec.md §4.3 "Dictionary").
//!
//! ClickHouse has no `ALTER DICTIONARY`: any attribute change becomes
//! `CREATE OR REPLACE DICTIONARY`. Renames are detected the same way as
//! tables.

use std::collections::HashSet;

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

use super::rename::find_rename_pairs;
use super::system::guard_object;

fn equal_ignoring_identity(a: &Dictionary, b: &Dictionary) -> bool {
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

fn same_qualifier(a: &Dictionary, b: &Dictionary) -> bool {
    a.database() == b.database()
}

fn create_stmt(dict: &Dictionary) -> Statement {
    let mut d = dict.clone();
    d.or_replace = true;
    Statement::CreateDictionary(d)
}

fn drop_stmt(dict: &Dictionary) -> Statement {
    Statement::DropDictionary(DropObjectRef {
        object: dict.object.clone(),
        cluster: dict.cluster.clone(),
        if_exists: true,
        sync: false,
    })
}

pub fn diff_dictionaries(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.dictionaries_sorted();
    let tgt = target.dictionaries_sorted();

    for d in cur.iter().chain(tgt.iter()) {
        guard_object(d.database(), d.name())?;
    }

    let cur_only: Vec<&Dictionary> = cur
        .iter()
        .copied()
        .filter(|d| target.dictionary(d.database(), d.name()).is_none())
        .collect();
    let tgt_only: Vec<&Dictionary> = tgt
        .iter()
        .copied()
        .filter(|d| current.dictionary(d.database(), d.name()).is_none())
        .collect();

    let pairs = find_rename_pairs(&cur_only, &tgt_only, equal_ignoring_identity, same_qualifier);
    let matched_cur: HashSet<usize> = pairs.iter().map(|(oi, _)| *oi).collect();
    let matched_tgt: HashSet<usize> = pairs.iter().map(|(_, ni)| *ni).collect();

    let mut creates = Vec::new();
    let mut renames = Vec::new();
    let mut drops = Vec::new();

    for (oi, ni) in &pairs {
        let old = cur_only[*oi];
        let new = tgt_only[*ni];
        renames.push((
            Statement::RenameDictionary(RenameObjectRef {
                from: old.object.clone(),
                to: new.object.clone(),
                cluster: new.cluster.clone(),
            }),
            Statement::RenameDictionary(RenameObjectRef {
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
        let Some(new) = target.dictionary(old.database(), old.name()) else {
            continue;
        };
        if old.cluster != new.cluster {
            return Err(RefusedChange::ClusterChange {
                object: old.object.qualified(),
                from: old.cluster.clone(),
                to: new.cluster.clone(),
            });
        }
        if old == new {
            continue;
        }
        creates.push((create_stmt(new), create_stmt(old)));
    }

    for (u, d) in creates.into_iter().chain(renames).chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
