//! Balanced binary tree of fat AABBs. Leaves hold proxies; internal nodes
//! hold the union of their children.

use crate::collision::{aabb::Aabb, broadphase::ProxyKey, queries::RayCastInput};

#[derive(Debug, Clone)]
struct TreeNode {
    aabb: Aabb,
    parent: Option<usize>,
    children: Option<[usize; 2]>,
    /// Leaf = 0. Free nodes keep whatever they last had.
    height: i32,
    /// Set on live leaves only.
    key: Option<ProxyKey>,
}

impl TreeNode {
    fn leaf(aabb: Aabb, key: ProxyKey) -> Self {
        Self {
            aabb,
            parent: None,
            children: None,
            height: 0,
            key: Some(key),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Dynamic AABB tree with surface-area insertion and AVL-style rotations.
///
/// Leaf node indices are stable for the life of a proxy, so they double as
/// proxy handles.
#[derive(Debug, Default)]
pub struct DynamicTree {
    nodes: Vec<TreeNode>,
    free_list: Vec<usize>,
    root: Option<usize>,
}

impl DynamicTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_proxy(&mut self, fat_aabb: Aabb, key: ProxyKey) -> usize {
        let leaf = self.allocate(TreeNode::leaf(fat_aabb, key));
        self.insert_leaf(leaf);
        leaf
    }

    /// Returns `false` if `proxy` is not a live leaf.
    pub fn destroy_proxy(&mut self, proxy: usize) -> bool {
        if self.leaf(proxy).is_none() {
            return false;
        }
        self.remove_leaf(proxy);
        self.release(proxy);
        true
    }

    /// Re-inserts `proxy` with a new fat box.
    pub fn move_proxy(&mut self, proxy: usize, fat_aabb: Aabb) -> bool {
        if self.leaf(proxy).is_none() {
            return false;
        }
        self.remove_leaf(proxy);
        self.nodes[proxy].aabb = fat_aabb;
        self.insert_leaf(proxy);
        true
    }

    pub fn fat_aabb(&self, proxy: usize) -> Option<Aabb> {
        self.leaf(proxy).map(|node| node.aabb)
    }

    pub fn user_data(&self, proxy: usize) -> Option<ProxyKey> {
        self.leaf(proxy).and_then(|node| node.key)
    }

    /// Height of the root; an empty tree and a single leaf are both 0.
    pub fn height(&self) -> i32 {
        self.root.map_or(0, |root| self.nodes[root].height)
    }

    /// Allocated nodes, internal ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Visits leaves whose box overlaps `aabb` until `callback` returns
    /// `false`.
    pub fn query(&self, aabb: &Aabb, callback: &mut dyn FnMut(usize) -> bool) {
        self.walk(|node| node.aabb.overlaps(aabb), callback);
    }

    /// Visits leaves whose box the segment enters until `callback` returns
    /// `false`.
    pub fn raycast(&self, input: &RayCastInput, callback: &mut dyn FnMut(usize) -> bool) {
        self.walk(|node| node.aabb.raycast(input).is_some(), callback);
    }

    fn walk<P>(&self, prune: P, callback: &mut dyn FnMut(usize) -> bool)
    where
        P: Fn(&TreeNode) -> bool,
    {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !prune(node) {
                continue;
            }
            match node.children {
                Some([a, b]) => {
                    stack.push(a);
                    stack.push(b);
                }
                None => {
                    if !callback(index) {
                        return;
                    }
                }
            }
        }
    }

    fn leaf(&self, index: usize) -> Option<&TreeNode> {
        self.nodes
            .get(index)
            .filter(|node| node.is_leaf() && node.key.is_some())
    }

    fn allocate(&mut self, node: TreeNode) -> usize {
        match self.free_list.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        node.parent = None;
        node.children = None;
        node.key = None;
        self.free_list.push(index);
    }

    fn insert_leaf(&mut self, leaf: usize) {
        let Some(root) = self.root else {
            self.nodes[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_aabb = self.nodes[leaf].aabb;
        let mut index = root;
        while let Some([child1, child2]) = self.nodes[index].children {
            let area = self.nodes[index].aabb.perimeter();
            let combined_area = self.nodes[index].aabb.union(&leaf_aabb).perimeter();

            // Cost of pairing the leaf with this node, and the minimum cost
            // pushed down to either child.
            let cost = 2.0 * combined_area;
            let inheritance = 2.0 * (combined_area - area);
            let cost1 = self.descend_cost(child1, &leaf_aabb) + inheritance;
            let cost2 = self.descend_cost(child2, &leaf_aabb) + inheritance;

            if cost < cost1 && cost < cost2 {
                break;
            }
            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.allocate(TreeNode {
            aabb: leaf_aabb.union(&self.nodes[sibling].aabb),
            parent: old_parent,
            children: Some([sibling, leaf]),
            height: self.nodes[sibling].height + 1,
            key: None,
        });

        match old_parent {
            Some(parent) => self.replace_child(parent, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        self.refit_from(Some(new_parent));
    }

    fn descend_cost(&self, child: usize, leaf_aabb: &Aabb) -> f32 {
        let node = &self.nodes[child];
        let combined = leaf_aabb.union(&node.aabb).perimeter();
        if node.is_leaf() {
            combined
        } else {
            combined - node.aabb.perimeter()
        }
    }

    fn remove_leaf(&mut self, leaf: usize) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }
        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };
        let Some([child1, child2]) = self.nodes[parent].children else {
            return;
        };
        let sibling = if child1 == leaf { child2 } else { child1 };
        let grand_parent = self.nodes[parent].parent;

        self.nodes[sibling].parent = grand_parent;
        match grand_parent {
            Some(grand_parent) => {
                self.replace_child(grand_parent, parent, sibling);
                self.refit_from(Some(grand_parent));
            }
            None => self.root = Some(sibling),
        }
        self.release(parent);
        self.nodes[leaf].parent = None;
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if let Some(children) = self.nodes[parent].children.as_mut() {
            for child in children.iter_mut().filter(|child| **child == old) {
                *child = new;
            }
        }
    }

    /// Rebalances and refits every ancestor from `start` up to the root.
    fn refit_from(&mut self, start: Option<usize>) {
        let mut index = start;
        while let Some(current) = index {
            let current = self.balance(current);
            self.refresh(current);
            index = self.nodes[current].parent;
        }
    }

    fn refresh(&mut self, index: usize) {
        if let Some([a, b]) = self.nodes[index].children {
            self.nodes[index].height = 1 + self.nodes[a].height.max(self.nodes[b].height);
            self.nodes[index].aabb = self.nodes[a].aabb.union(&self.nodes[b].aabb);
        }
    }

    /// Rotates the taller child of `index` up when the children differ in
    /// height by more than one. Returns the node now at that position.
    fn balance(&mut self, index: usize) -> usize {
        let Some([b, c]) = self.nodes[index].children else {
            return index;
        };
        if self.nodes[index].height < 2 {
            return index;
        }

        let skew = self.nodes[c].height - self.nodes[b].height;
        if skew > 1 {
            self.rotate_up(index, c, b)
        } else if skew < -1 {
            self.rotate_up(index, b, c)
        } else {
            index
        }
    }

    fn rotate_up(&mut self, index: usize, high: usize, low: usize) -> usize {
        let Some([f, g]) = self.nodes[high].children else {
            return index;
        };
        let (tall, short) = if self.nodes[f].height > self.nodes[g].height {
            (f, g)
        } else {
            (g, f)
        };

        let parent = self.nodes[index].parent;
        self.nodes[high].parent = parent;
        match parent {
            Some(parent) => self.replace_child(parent, index, high),
            None => self.root = Some(high),
        }

        self.nodes[index].parent = Some(high);
        self.nodes[index].children = Some([low, short]);
        self.nodes[short].parent = Some(index);
        self.nodes[high].children = Some([index, tall]);

        self.refresh(index);
        self.refresh(high);
        high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::FixtureId;
    use glam::Vec2;

    fn key(index: usize) -> ProxyKey {
        ProxyKey {
            fixture: FixtureId::new(index, 0),
            child_index: 0,
        }
    }

    fn square(x: f32, y: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec2::new(x, y), Vec2::splat(0.5))
    }

    /// Checks parent links, heights and enclosing boxes below `index`.
    fn validate(tree: &DynamicTree, index: usize) -> i32 {
        let node = &tree.nodes[index];
        match node.children {
            None => {
                assert_eq!(node.height, 0);
                0
            }
            Some([a, b]) => {
                assert_eq!(tree.nodes[a].parent, Some(index));
                assert_eq!(tree.nodes[b].parent, Some(index));
                assert!(node.aabb.contains(&tree.nodes[a].aabb));
                assert!(node.aabb.contains(&tree.nodes[b].aabb));
                let (ha, hb) = (validate(tree, a), validate(tree, b));
                assert_eq!(node.height, 1 + ha.max(hb));
                node.height
            }
        }
    }

    #[test]
    fn sorted_inserts_stay_balanced() {
        let mut tree = DynamicTree::new();
        for i in 0..256 {
            tree.create_proxy(square(i as f32 * 2.0, 0.0), key(i));
        }
        let root = tree.root.unwrap();
        validate(&tree, root);
        assert!(tree.height() < 32, "height {}", tree.height());
        assert_eq!(tree.node_count(), 2 * 256 - 1);
    }

    #[test]
    fn removing_leaves_keeps_structure() {
        let mut tree = DynamicTree::new();
        let proxies: Vec<usize> = (0..64)
            .map(|i| tree.create_proxy(square((i % 8) as f32, (i / 8) as f32), key(i)))
            .collect();
        for &proxy in proxies.iter().step_by(2) {
            assert!(tree.destroy_proxy(proxy));
        }
        assert!(!tree.destroy_proxy(proxies[0]));

        validate(&tree, tree.root.unwrap());
        assert_eq!(tree.node_count(), 2 * 32 - 1);

        for &proxy in proxies.iter().skip(1).step_by(2) {
            tree.destroy_proxy(proxy);
        }
        assert_eq!(tree.root, None);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn moved_leaves_keep_their_index() {
        let mut tree = DynamicTree::new();
        let a = tree.create_proxy(square(0.0, 0.0), key(0));
        tree.create_proxy(square(5.0, 0.0), key(1));
        tree.create_proxy(square(10.0, 0.0), key(2));

        assert!(tree.move_proxy(a, square(20.0, 0.0)));
        assert_eq!(tree.user_data(a), Some(key(0)));
        assert_eq!(tree.fat_aabb(a), Some(square(20.0, 0.0)));
        validate(&tree, tree.root.unwrap());

        let mut hits = Vec::new();
        tree.query(&square(19.0, 0.0), &mut |leaf| {
            hits.push(leaf);
            true
        });
        assert_eq!(hits, vec![a]);
    }

    #[test]
    fn raycast_skips_boxes_off_the_segment() {
        let mut tree = DynamicTree::new();
        let hit = tree.create_proxy(square(3.0, 0.0), key(0));
        tree.create_proxy(square(3.0, 5.0), key(1));
        tree.create_proxy(square(-3.0, 0.0), key(2));

        let input = RayCastInput::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        let mut visited = Vec::new();
        tree.raycast(&input, &mut |leaf| {
            visited.push(leaf);
            true
        });
        assert_eq!(visited, vec![hit]);
    }
}
