//! Exported assignment tree.
//!
//! The transport collaborator receives a rooted tree mirroring the
//! stratum hierarchy. Leaf groups carry the original record
//! *identifiers* — arena pointers never leave the core.

use crate::arena::PointerArena;
use crate::interner::StringInterner;
use crate::records::RecordStore;
use crate::tree::GroupTree;

/// One node of the exported tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignmentNode {
    /// An intermediate group at a non-leaf stratum.
    Group {
        stratum: String,
        children: Vec<AssignmentNode>,
    },
    /// A leaf-stratum group listing its members by identifier.
    Leaf {
        stratum: String,
        members: Vec<String>,
    },
}

/// The rooted assignment tree. The implicit root spans every record;
/// its children are the topmost declared stratum's groups.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentTree {
    pub children: Vec<AssignmentNode>,
}

impl AssignmentTree {
    pub fn from_tree(
        tree: &GroupTree,
        arena: &PointerArena,
        store: &RecordStore,
        interner: &StringInterner,
    ) -> Self {
        let top = tree.strata().len() - 1;
        let children = tree.strata()[top]
            .nodes
            .iter()
            .map(|node| export_node(tree, top, node.offset(), node.len(), arena, store, interner))
            .collect();
        Self { children }
    }
}

fn export_node(
    tree: &GroupTree,
    level: usize,
    offset: usize,
    len: usize,
    arena: &PointerArena,
    store: &RecordStore,
    interner: &StringInterner,
) -> AssignmentNode {
    let stratum = &tree.strata()[level];
    if level == 0 {
        let members = arena.working()[offset..offset + len]
            .iter()
            .map(|&p| store.id_of(p as usize, interner))
            .collect();
        return AssignmentNode::Leaf {
            stratum: stratum.id.clone(),
            members,
        };
    }

    // Children are the lower stratum's nodes whose windows nest inside
    // this one; the partition invariant makes containment a simple
    // range check.
    let children = tree.strata()[level - 1]
        .nodes
        .iter()
        .filter(|child| child.offset() >= offset && child.offset() + child.len() <= offset + len)
        .map(|child| {
            export_node(
                tree,
                level - 1,
                child.offset(),
                child.len(),
                arena,
                store,
                interner,
            )
        })
        .collect();
    AssignmentNode::Group {
        stratum: stratum.id.clone(),
        children,
    }
}
