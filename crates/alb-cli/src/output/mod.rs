//! Tree view of property, policy, load balancing ID and origin associations.

use std::collections::BTreeSet;
use std::io::{self, Write};

const TREE_INTRO: &str =
    "INFO: this is a tree view of the properties, policies, load IDs and origins associations";
const TREE_LEGEND: &str = "|--- Property\n    |--------- Policy\n              |------------ Load ID\n                           |------------ Origin\n";

const PROPERTY_BRANCH: &str = "|---";
const POLICY_BRANCH: &str = "    |---------";
const LOAD_ID_BRANCH: &str = "              |------------";
const ORIGIN_BRANCH: &str = "                           |------------";

/// Origins shown under one load balancing ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OriginLeaves {
    /// Origins of the version active on staging.
    Active(BTreeSet<String>),
    /// Nothing is active on staging.
    NoActiveVersion,
}

/// One policy and everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssociationTree {
    pub(crate) policy: String,
    pub(crate) properties: BTreeSet<String>,
    pub(crate) load_balancers: Vec<(String, OriginLeaves)>,
}

/// Writes the tree for one policy, preceded by the legend.
pub(crate) fn render_tree<W: Write>(out: &mut W, tree: &AssociationTree) -> io::Result<()> {
    writeln!(out, "{TREE_INTRO}")?;
    writeln!(out, "{TREE_LEGEND}")?;
    for property in &tree.properties {
        writeln!(out, "{PROPERTY_BRANCH} {property}")?;
    }
    writeln!(out, "{POLICY_BRANCH} {}", tree.policy)?;
    for (load_id, origins) in &tree.load_balancers {
        writeln!(out, "{LOAD_ID_BRANCH} {load_id}")?;
        match origins {
            OriginLeaves::Active(names) => {
                for origin in names {
                    writeln!(out, "{ORIGIN_BRANCH} {origin}")?;
                }
            }
            OriginLeaves::NoActiveVersion => {
                writeln!(out, "{ORIGIN_BRANCH} (no active staging version)")?;
            }
        }
    }
    Ok(())
}
