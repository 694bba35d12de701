//! Grant/revoke differ (spec.md §4.3 "separate GRANT/REVOKE diffing for
//! role privileges (set difference on (privilege, object, with-grant-option)
//! triples)").

use crate::ast::*;
use crate::error::RefusedChange;
use crate::model::Schema;

/// A single `(role, privilege, target, with_grant_option)` fact, the unit
/// the set difference operates on. A multi-privilege `GRANT a, b ON ...`
/// statement is exploded into one fact per privilege so that changing one
/// privilege on an otherwise-unchanged grant doesn't touch the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GrantFact {
    to: String,
    privilege: String,
    target: GrantTarget,
    with_grant_option: bool,
    cluster: Option<String>,
}

fn facts(schema: &Schema) -> Vec<GrantFact> {
    schema
        .grants()
        .iter()
        .flat_map(|g| {
            g.privileges.iter().map(move |p| GrantFact {
                to: g.to.clone(),
                privilege: p.clone(),
                target: g.target.clone(),
                with_grant_option: g.with_grant_option,
                cluster: g.cluster.clone(),
            })
        })
        .collect()
}

fn grant_stmt(f: &GrantFact) -> Statement {
    Statement::Grant(Grant {
        privileges: vec![f.privilege.clone()],
        target: f.target.clone(),
        to: f.to.clone(),
        with_grant_option: f.with_grant_option,
        cluster: f.cluster.clone(),
    })
}

fn revoke_stmt(f: &GrantFact) -> Statement {
    Statement::Revoke(Revoke {
        privileges: vec![f.privilege.clone()],
        target: f.target.clone(),
        from: f.to.clone(),
        cluster: f.cluster.clone(),
    })
}

pub fn diff_grants(
    current: &Schema,
    target: &Schema,
    up: &mut Vec<Statement>,
    down: &mut Vec<Statement>,
) -> Result<(), RefusedChange> {
    let cur = facts(current);
    let tgt = facts(target);

    let mut creates = Vec::new();
    let mut drops = Vec::new();

    for f in &tgt {
        if !cur.contains(f) {
            creates.push((grant_stmt(f), revoke_stmt(f)));
        }
    }

    for f in &cur {
        if !tgt.contains(f) {
            drops.push((revoke_stmt(f), grant_stmt(f)));
        }
    }

    for (u, d) in creates.into_iter().chain(drops) {
        up.push(u);
        down.push(d);
    }
    Ok(())
}
