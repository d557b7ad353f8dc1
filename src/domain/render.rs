//! Text rendering of a mind map as an ASCII tree.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::TreeArena;
use crate::domain::NodeId;

/// How node labels are drawn.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Spaces per `level` step in front of the title
    pub indent: usize,
    /// Append the short node id
    pub show_ids: bool,
    /// Prefix each label with its pre-order position (`#0`, `#1`, ...)
    pub numbered: bool,
    /// Node to mark as selected
    pub selected: Option<NodeId>,
}

pub trait TreeRender {
    fn to_tree_string(&self, options: &RenderOptions) -> Tree<String>;
}

impl TreeRender for TreeArena {
    fn to_tree_string(&self, options: &RenderOptions) -> Tree<String> {
        let positions: HashMap<NodeId, usize> = if options.numbered {
            self.ids()
                .into_iter()
                .enumerate()
                .map(|(pos, id)| (id, pos))
                .collect()
        } else {
            HashMap::new()
        };
        let label = |idx: Index| -> String {
            let Some(node) = self.get_node(idx) else {
                return String::new();
            };
            let data = &node.data;
            let mut label = String::new();
            if options.numbered {
                if let Some(pos) = positions.get(&data.id) {
                    label.push_str(&format!("#{pos} "));
                }
            }
            if options.selected == Some(data.id) {
                label.push_str("* ");
            }
            label.push_str(&" ".repeat(options.indent * data.level as usize));
            label.push_str(&data.title);
            if options.show_ids {
                label.push_str(&format!(" [{}]", data.id.short()));
            }
            label
        };

        fn build_tree(
            arena: &TreeArena,
            node_idx: Index,
            label: &dyn Fn(Index) -> String,
        ) -> Tree<String> {
            let leaves: Vec<_> = arena
                .get_node(node_idx)
                .map(|node| {
                    node.children
                        .iter()
                        .map(|&child| build_tree(arena, child, label))
                        .collect()
                })
                .unwrap_or_default();
            Tree::new(label(node_idx)).with_leaves(leaves)
        }

        build_tree(self, self.root(), &label)
    }
}
