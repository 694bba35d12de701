//! View differ (spec.md §4.3 "View").
//!
//! A regular view's body changing is `CREATE OR REPLACE VIEW`. A
//! materialized view's body changing has no in-place form (its backing
//! table's structure may need to change too), so it's DROP TABLE +
//! CREATE MATERIALIZED VIEW. Renames use `RENAME TABLE` for both forms.

use std::collections::HashSet;

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

use super::rename::find_rename_pairs;
use super::system::guard_object;

fn object_ref(view: &View) -> ObjectRef {
    ObjectRef::new(view.database().map(str::to_string), view.name().to_string())
}

fn cluster(view: &View) -> Option<String> {
    match view {
        View::Regular(v) => v.cluster.clone(),
        View::Materialized(v) => v.cluster.clone(),
    }
}

fn equal_ignoring_identity(a: &View, b: &View) -> bool {
    match (a, b) {
        (View::Regular(a), View::Regular(b)) => {
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
        (View::Materialized(a), View::Materialized(b)) => {
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
        _ => false,
    }
}

fn same_qualifier(a: &View, b: &View) -> bool {
    a.database() == b.database()
}

fn create_stmt(view: &View) -> Statement {
    match view {
        View::Regular(v) => {
            let mut v = v.clone();
            v.or_replace = true;
            Statement::CreateView(v)
        }
        View::Materialized(v) => {
            let mut v = v.clone();
            v.or_replace = true;
            Statement::CreateMaterializedView(v)
        }
    }
}

fn drop_stmt(view: &View) -> Statement {
    Statement::DropView(DropObjectRef {
        object: object_ref(view),
        cluster: cluster(view),
        if_exists: true,
        sync: false,
    })
}

fn drop_table_stmt(view: &View) -> Statement {
    Statement::DropTable(DropObjectRef {
        object: object_ref(view),
        cluster: cluster(view),
        if_exists: true,
        sync: false,
    })
}

pub fn diff_views(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = current.views_sorted();
    let tgt = target.views_sorted();

    for v in cur.iter().chain(tgt.iter()) {
        guard_object(v.database(), v.name())?;
    }

    let cur_only: Vec<&View> = cur
        .iter()
        .copied()
        .filter(|v| target.view(v.database(), v.name()).is_none())
        .collect();
    let tgt_only: Vec<&View> = tgt
        .iter()
        .copied()
        .filter(|v| current.view(v.database(), v.name()).is_none())
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
                from: object_ref(old),
                to: object_ref(new),
                cluster: cluster(new),
            }),
            Statement::RenameTable(RenameObjectRef {
                from: object_ref(new),
                to: object_ref(old),
                cluster: cluster(old),
            }),
        ));
    }

    for (i, old) in cur_only.iter().enumerate() {
        if matched_cur.contains(&i) {
            continue;
        }
        let down_create = create_stmt(old);
        let up_drop = if old.is_materialized() {
            drop_table_stmt(old)
        } else {
            drop_stmt(old)
        };
        drops.push((up_drop, down_create));
    }

    for (i, new) in tgt_only.iter().enumerate() {
        if matched_tgt.contains(&i) {
            continue;
        }
        let down_drop = if new.is_materialized() {
            drop_table_stmt(new)
        } else {
            drop_stmt(new)
        };
        creates.push((create_stmt(new), down_drop));
    }

    for old in &cur {
        let Some(new) = target.view(old.database(), old.name()) else {
            continue;
        };
        if old == new {
            continue;
        }
        match (old, new) {
            (View::Regular(_), View::Regular(_)) => {
                creates.push((create_stmt(new), create_stmt(old)));
            }
            (View::Materialized(_), View::Materialized(_)) => {
                alters.push((drop_table_stmt(old), create_stmt(old)));
                alters.push((create_stmt(new), drop_table_stmt(new)));
            }
            _ => {
                return Err(RefusedChange::UnsupportedAlter {
                    object: object_ref(old).qualified(),
                    reason: "changing a view between regular and materialized is not supported"
                        .to_string(),
                });
            }
        }
    }

    for (u, d) in creates.into_iter().chain(alters).chain(renames).chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
