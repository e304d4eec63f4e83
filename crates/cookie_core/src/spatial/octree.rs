//! Octree spatial partitioning structure
//!
//! Divides the region spanned by its participants into nested octants so a
//! collision query only has to look at the objects along one root-to-leaf
//! path. The tree is rebuilt wholesale rather than updated per move: callers
//! register participants with [`Octree::add_object`] and call
//! [`Octree::build_tree`] whenever the set (or a participant's bounds) has
//! changed.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The eight
//! children of a node are allocated contiguously, so a node only stores the
//! id of its first child.

use std::fmt::Debug;

use log::debug;

use crate::config::OctreeConfig;
use crate::foundation::math::Vec3;
use crate::spatial::BoundingBox;

/// Index of a node in the octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }

    fn offset(self, by: usize) -> NodeId {
        NodeId(self.0 + by)
    }
}

/// Object registered with the octree, with a snapshot of its bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeEntry<K> {
    /// Caller's handle for the object
    pub key: K,
    /// World-space bounds at registration time; `None` never collides
    pub bounds: Option<BoundingBox>,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeNode<K> {
    region: BoundingBox,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    depth: u32,
    /// Objects this node is the smallest enclosing region for
    enclosed: Vec<OctreeEntry<K>>,
    /// Objects waiting to be pushed down during construction
    staged: Vec<OctreeEntry<K>>,
}

impl<K: Copy + PartialEq> OctreeNode<K> {
    fn new(region: BoundingBox, parent: Option<NodeId>, depth: u32) -> Self {
        Self {
            region,
            parent,
            first_child: None,
            depth,
            enclosed: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// World-space region covered by this node
    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    /// Objects settled at this node
    pub fn enclosed(&self) -> &[OctreeEntry<K>] {
        &self.enclosed
    }

    /// True only if every corner of `bounds` lies inside this node's region
    ///
    /// Objects without bounds are never contained.
    pub fn contains(&self, bounds: Option<&BoundingBox>) -> bool {
        bounds.is_some_and(|b| self.region.contains_box(b))
    }

    fn child_ids(&self) -> impl Iterator<Item = NodeId> {
        let first = self.first_child;
        (0..8).filter_map(move |octant| first.map(|f| f.offset(octant)))
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree<K> {
    nodes: Vec<OctreeNode<K>>,
    objects: Vec<OctreeEntry<K>>,
    config: OctreeConfig,
    built: bool,
}

impl<K: Copy + PartialEq + Debug> Default for Octree<K> {
    fn default() -> Self {
        Self::new(OctreeConfig::default())
    }
}

impl<K: Copy + PartialEq + Debug> Octree<K> {
    /// Create an empty, unbuilt octree
    pub fn new(config: OctreeConfig) -> Self {
        Self {
            nodes: vec![OctreeNode::new(BoundingBox::default(), None, 0)],
            objects: Vec::new(),
            config,
            built: false,
        }
    }

    /// Register an object for the next build
    ///
    /// Registering a key again replaces its bounds.
    pub fn add_object(&mut self, key: K, bounds: Option<BoundingBox>) {
        match self.objects.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.bounds = bounds,
            None => self.objects.push(OctreeEntry { key, bounds }),
        }
    }

    /// Unregister an object; returns false if it was not registered
    pub fn remove_object(&mut self, key: K) -> bool {
        let before = self.objects.len();
        self.objects.retain(|entry| entry.key != key);
        self.objects.len() != before
    }

    /// Unregister every object. The current tree stays until the next build.
    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Replace the whole registration list in one pass
    ///
    /// Keys are taken as given; the caller guarantees they are distinct.
    pub fn set_objects(&mut self, objects: impl IntoIterator<Item = (K, Option<BoundingBox>)>) {
        self.clear_objects();
        self.objects
            .extend(objects.into_iter().map(|(key, bounds)| OctreeEntry { key, bounds }));
    }

    /// Number of registered objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether [`build_tree`](Self::build_tree) has run at least once
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Build parameters
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Rebuild the tree from the registered objects
    ///
    /// A fresh arena is constructed and then swapped in, so the previous tree
    /// is fully discarded. Building an unchanged set again yields an
    /// identical tree.
    pub fn build_tree(&mut self) {
        let mut root = OctreeNode::new(Self::root_region(&self.objects), None, 0);
        root.staged = self.objects.clone();

        let mut nodes = vec![root];
        Self::build_tree_node(&mut nodes, NodeId::ROOT, &self.config);

        self.nodes = nodes;
        self.built = true;

        debug!(
            "Octree rebuilt: {} objects, {} nodes, depth {}, {} at root",
            self.objects.len(),
            self.nodes.len(),
            self.max_depth_reached(),
            self.root().enclosed.len()
        );
    }

    /// Tightest box around every registered object that has bounds
    fn root_region(objects: &[OctreeEntry<K>]) -> BoundingBox {
        objects
            .iter()
            .filter_map(|entry| entry.bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }

    fn build_tree_node(nodes: &mut Vec<OctreeNode<K>>, id: NodeId, config: &OctreeConfig) {
        let region = nodes[id.0].region;
        let depth = nodes[id.0].depth;
        let dim = region.extent();

        // Small enough: everything left settles here
        let at_min_size = dim.x <= config.min_node_size
            && dim.y <= config.min_node_size
            && dim.z <= config.min_node_size;
        if at_min_size || depth >= config.max_depth {
            let staged = std::mem::take(&mut nodes[id.0].staged);
            nodes[id.0].enclosed.extend(staged);
            return;
        }

        let min = region.min();
        let max = region.max();
        let center = region.center();
        let first_child = NodeId(nodes.len());

        // Octant bits: 1 = upper x half, 2 = upper y half, 4 = upper z half
        for octant in 0..8 {
            let (lo_x, hi_x) = if octant & 1 == 0 { (min.x, center.x) } else { (center.x, max.x) };
            let (lo_y, hi_y) = if octant & 2 == 0 { (min.y, center.y) } else { (center.y, max.y) };
            let (lo_z, hi_z) = if octant & 4 == 0 { (min.z, center.z) } else { (center.z, max.z) };

            let child_region = BoundingBox::new(
                Vec3::new(lo_x, lo_y, lo_z),
                Vec3::new(hi_x, hi_y, hi_z),
            );
            nodes.push(OctreeNode::new(child_region, Some(id), depth + 1));
        }
        nodes[id.0].first_child = Some(first_child);

        // Push down everything a single child fully contains; straddlers and
        // objects without bounds stay at this level
        let staged = std::mem::take(&mut nodes[id.0].staged);
        for entry in staged {
            let target = (0..8)
                .map(|octant| first_child.offset(octant))
                .find(|child| nodes[child.0].contains(entry.bounds.as_ref()));

            match target {
                Some(child) => nodes[child.0].staged.push(entry),
                None => nodes[id.0].enclosed.push(entry),
            }
        }

        for octant in 0..8 {
            let child = first_child.offset(octant);
            if !nodes[child.0].staged.is_empty() {
                Self::build_tree_node(nodes, child, config);
            }
        }
    }

    /// Every registered object whose bounds overlap `query`
    ///
    /// At each node the search follows the single child that fully contains
    /// the query, if there is one; a query straddling a split instead visits
    /// every child its bounds touch. Objects settled at each visited node are
    /// tested directly. `exclude` filters out the querying object itself.
    ///
    /// Before the first build only the (empty) root is consulted.
    pub fn check_intersection(&self, query: Option<&BoundingBox>, exclude: Option<K>) -> Vec<K> {
        let mut hits = Vec::new();
        if let Some(query) = query {
            self.collect_intersections(NodeId::ROOT, query, exclude, &mut hits);
        }
        hits
    }

    fn collect_intersections(&self, id: NodeId, query: &BoundingBox, exclude: Option<K>, hits: &mut Vec<K>) {
        let node = &self.nodes[id.0];

        if !node.is_leaf() {
            let containing = node.child_ids().find(|child| self.nodes[child.0].contains(Some(query)));
            match containing {
                Some(child) => self.collect_intersections(child, query, exclude, hits),
                None => {
                    for child in node.child_ids() {
                        if self.nodes[child.0].region.touches(query) {
                            self.collect_intersections(child, query, exclude, hits);
                        }
                    }
                }
            }
        }

        for entry in &node.enclosed {
            if Some(entry.key) == exclude {
                continue;
            }
            if entry.bounds.is_some_and(|b| b.intersects(query)) {
                hits.push(entry.key);
            }
        }
    }

    /// Root node
    pub fn root(&self) -> &OctreeNode<K> {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&OctreeNode<K>> {
        self.nodes.get(id.0)
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[OctreeNode<K>] {
        &self.nodes
    }

    /// Children of a node, empty for leaves
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(|node| node.child_ids().collect()).unwrap_or_default()
    }

    /// Whether node `id` fully contains `bounds`
    pub fn contains(&self, id: NodeId, bounds: Option<&BoundingBox>) -> bool {
        self.node(id).is_some_and(|node| node.contains(bounds))
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all leaf nodes (for visualization)
    pub fn leaves(&self) -> Vec<&OctreeNode<K>> {
        self.nodes.iter().filter(|node| node.is_leaf()).collect()
    }

    /// Get all nodes at a specific depth (for visualization)
    pub fn nodes_at_depth(&self, depth: u32) -> Vec<&OctreeNode<K>> {
        self.nodes.iter().filter(|node| node.depth == depth).collect()
    }

    /// Deepest level present in the tree
    pub fn max_depth_reached(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Number of objects settled in the built tree
    pub fn entity_count(&self) -> usize {
        self.nodes.iter().map(|node| node.enclosed.len()).sum()
    }

    /// Node an object settled in, if it is part of the built tree
    pub fn node_of(&self, key: K) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.enclosed.iter().any(|entry| entry.key == key))
            .map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn cube(center: Vec3, half: f32) -> BoundingBox {
        BoundingBox::from_center_extents(center, Vec3::new(half, half, half))
    }

    fn brute_force(objects: &[(u32, BoundingBox)], query: &BoundingBox, exclude: u32) -> Vec<u32> {
        let mut hits: Vec<u32> = objects
            .iter()
            .filter(|(key, b)| *key != exclude && b.intersects(query))
            .map(|(key, _)| *key)
            .collect();
        hits.sort_unstable();
        hits
    }

    fn sorted(mut keys: Vec<u32>) -> Vec<u32> {
        keys.sort_unstable();
        keys
    }

    fn random_scene(seed: u64, count: u32) -> Vec<(u32, BoundingBox)> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|key| {
                let center = Vec3::new(
                    rng.gen_range(-40.0..40.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(-40.0..40.0),
                );
                let half = Vec3::new(rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0));
                (key, BoundingBox::from_center_extents(center, half))
            })
            .collect()
    }

    fn build(objects: &[(u32, BoundingBox)]) -> Octree<u32> {
        let mut octree = Octree::default();
        for (key, bounds) in objects {
            octree.add_object(*key, Some(*bounds));
        }
        octree.build_tree();
        octree
    }

    #[test]
    fn test_unbuilt_tree_returns_nothing() {
        let mut octree: Octree<u32> = Octree::default();
        octree.add_object(1, Some(cube(Vec3::zeros(), 1.0)));

        assert!(!octree.is_built());
        assert!(octree.check_intersection(Some(&cube(Vec3::zeros(), 1.0)), None).is_empty());
    }

    #[test]
    fn test_root_region_is_union_of_objects() {
        let octree = build(&[
            (1, cube(Vec3::new(-10.0, 0.0, 0.0), 1.0)),
            (2, cube(Vec3::new(10.0, 5.0, 3.0), 1.0)),
        ]);

        assert_eq!(octree.root().region().min(), Vec3::new(-11.0, -1.0, -1.0));
        assert_eq!(octree.root().region().max(), Vec3::new(11.0, 6.0, 4.0));
    }

    #[test]
    fn test_nodes_have_zero_or_eight_children() {
        let octree = build(&random_scene(7, 60));
        for (index, node) in octree.nodes().iter().enumerate() {
            let children = octree.children(NodeId(index));
            assert!(children.is_empty() || children.len() == 8);
            assert_eq!(node.is_leaf(), children.is_empty());
            for child in children {
                assert_eq!(octree.node(child).unwrap().parent(), Some(NodeId(index)));
                assert_eq!(octree.node(child).unwrap().depth(), node.depth() + 1);
            }
        }
    }

    #[test]
    fn test_octants_partition_parent() {
        let octree = build(&random_scene(3, 20));
        let root = octree.root();
        let children = octree.children(NodeId::ROOT);
        assert_eq!(children.len(), 8);

        let center = root.region().center();
        let mut union: Option<BoundingBox> = None;
        for child in &children {
            let region = octree.node(*child).unwrap().region();
            assert!(root.region().contains_box(region));
            assert!(region.contains_point(&center));
            union = Some(union.map_or(*region, |u| u.union(region)));
            for other in &children {
                if other != child {
                    assert!(!region.intersects(octree.node(*other).unwrap().region()));
                }
            }
        }
        assert_eq!(union.unwrap().min(), root.region().min());
        assert_eq!(union.unwrap().max(), root.region().max());
    }

    #[test]
    fn test_each_object_settles_in_exactly_one_node() {
        let scene = random_scene(11, 80);
        let octree = build(&scene);

        assert_eq!(octree.entity_count(), scene.len());

        for (key, bounds) in &scene {
            assert!(octree.contains(NodeId::ROOT, Some(bounds)));

            let settled = octree
                .nodes()
                .iter()
                .filter(|node| node.enclosed().iter().any(|entry| entry.key == *key))
                .count();
            assert_eq!(settled, 1, "object {key} settled {settled} times");

            // Following the first containing child from the root ends at its node
            let target = octree.node_of(*key).unwrap();
            let mut current = NodeId::ROOT;
            while current != target {
                current = octree
                    .children(current)
                    .into_iter()
                    .find(|child| octree.contains(*child, Some(bounds)))
                    .expect("containment chain broken before reaching the object's node");
            }
        }
    }

    #[test]
    fn test_straddling_object_stays_at_parent() {
        let octree = build(&[
            (1, cube(Vec3::new(-8.0, -8.0, -8.0), 0.5)),
            (2, cube(Vec3::new(8.0, 8.0, 8.0), 0.5)),
            // Sits on the root midpoint
            (3, cube(Vec3::zeros(), 1.0)),
        ]);

        assert_eq!(octree.node_of(3), Some(NodeId::ROOT));
        assert_ne!(octree.node_of(1), Some(NodeId::ROOT));
        assert_ne!(octree.node_of(2), Some(NodeId::ROOT));
    }

    #[test]
    fn test_object_without_bounds_stays_at_root() {
        let mut octree = Octree::default();
        octree.add_object(1u32, Some(cube(Vec3::new(-5.0, 0.0, 0.0), 0.5)));
        octree.add_object(2u32, Some(cube(Vec3::new(5.0, 0.0, 0.0), 0.5)));
        octree.add_object(3u32, None);
        octree.build_tree();

        assert!(!octree.contains(NodeId::ROOT, None));
        assert_eq!(octree.node_of(3), Some(NodeId::ROOT));
        assert!(!octree.check_intersection(Some(octree.root().region()), None).contains(&3));
        assert!(octree.check_intersection(None, None).is_empty());
    }

    #[test]
    fn test_min_size_region_is_not_subdivided() {
        let octree = build(&[
            (1, cube(Vec3::new(0.2, 0.2, 0.2), 0.1)),
            (2, cube(Vec3::new(0.7, 0.7, 0.7), 0.1)),
        ]);

        assert!(octree.root().is_leaf());
        assert_eq!(octree.node_count(), 1);
        assert_eq!(octree.root().enclosed().len(), 2);
    }

    #[test]
    fn test_subdivision_stops_at_min_size() {
        let octree = build(&random_scene(5, 40));
        for leaf in octree.leaves() {
            if !leaf.enclosed().is_empty() && leaf.depth() > 0 {
                let parent = octree.node(leaf.parent().unwrap()).unwrap();
                let dim = parent.region().extent();
                assert!(dim.x > 1.0 || dim.y > 1.0 || dim.z > 1.0);
            }
        }
        assert!(octree.max_depth_reached() >= 1);
        assert!(!octree.nodes_at_depth(1).is_empty());
    }

    #[test]
    fn test_query_matches_brute_force() {
        let scene = random_scene(42, 150);
        let octree = build(&scene);

        // Every object as a query, excluding itself
        for (key, bounds) in &scene {
            let found = sorted(octree.check_intersection(Some(bounds), Some(*key)));
            assert_eq!(found, brute_force(&scene, bounds, *key), "query for object {key}");
        }

        // Arbitrary queries, including ones straddling the root split
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let center = Vec3::new(rng.gen_range(-45.0..45.0), rng.gen_range(-2.0..12.0), rng.gen_range(-45.0..45.0));
            let query = cube(center, rng.gen_range(0.2..15.0));
            let found = sorted(octree.check_intersection(Some(&query), None));
            assert_eq!(found, brute_force(&scene, &query, u32::MAX));
        }
    }

    #[test]
    fn test_query_finds_ancestor_level_objects() {
        let octree = build(&[
            (1, cube(Vec3::new(-8.0, -8.0, -8.0), 0.5)),
            (2, cube(Vec3::new(8.0, 8.0, 8.0), 0.5)),
            (3, cube(Vec3::zeros(), 1.0)),
        ]);

        // Small query deep inside the lower octant, overlapping the root-level straddler
        let query = cube(Vec3::new(-0.9, -0.9, -0.9), 0.3);
        assert_eq!(octree.check_intersection(Some(&query), None), vec![3]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let mut octree = build(&random_scene(8, 90));
        let first = octree.nodes().to_vec();

        octree.build_tree();
        assert_eq!(octree.nodes(), first.as_slice());

        octree.build_tree();
        assert_eq!(octree.nodes(), first.as_slice());
    }

    #[test]
    fn test_rebuild_reflects_removed_and_moved_objects() {
        let mut octree = build(&[
            (1, cube(Vec3::new(-5.0, 0.0, 0.0), 0.5)),
            (2, cube(Vec3::new(5.0, 0.0, 0.0), 0.5)),
        ]);
        let query = cube(Vec3::new(5.0, 0.0, 0.0), 0.2);
        assert_eq!(octree.check_intersection(Some(&query), None), vec![2]);

        assert!(octree.remove_object(2));
        assert!(!octree.remove_object(2));
        octree.add_object(1, Some(cube(Vec3::new(5.0, 0.0, 0.0), 0.5)));

        // Stale until rebuilt
        assert_eq!(octree.check_intersection(Some(&query), None), vec![2]);

        octree.build_tree();
        assert_eq!(octree.check_intersection(Some(&query), None), vec![1]);
        assert_eq!(octree.object_count(), 1);
        assert_eq!(octree.entity_count(), 1);
    }

    #[test]
    fn test_set_objects_replaces_registrations() {
        let mut octree = build(&[(1, cube(Vec3::zeros(), 0.5)), (2, cube(Vec3::new(4.0, 0.0, 0.0), 0.5))]);

        octree.set_objects([(3, Some(cube(Vec3::new(-4.0, 0.0, 0.0), 0.5))), (4, None)]);
        assert_eq!(octree.object_count(), 2);
        octree.build_tree();
        assert_eq!(octree.check_intersection(Some(&cube(Vec3::new(-4.0, 0.0, 0.0), 0.2)), None), vec![3]);
        assert!(octree.check_intersection(Some(&cube(Vec3::zeros(), 0.2)), None).is_empty());

        octree.clear_objects();
        assert_eq!(octree.object_count(), 0);
        // Built tree is kept until the next build
        assert_eq!(octree.entity_count(), 2);
        octree.build_tree();
        assert_eq!(octree.entity_count(), 0);
    }

    #[test]
    fn test_empty_tree_builds_single_root() {
        let mut octree: Octree<u32> = Octree::default();
        octree.build_tree();

        assert!(octree.is_built());
        assert_eq!(octree.node_count(), 1);
        assert_eq!(octree.entity_count(), 0);
        assert!(octree.check_intersection(Some(&cube(Vec3::zeros(), 10.0)), None).is_empty());
    }
}
