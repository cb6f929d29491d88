//! Octree over vertex positions, used to find weld candidates.

use nalgebra::{Point3, Vector3};

use crate::mesh::VertexId;

/// Configuration for octree construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeConfig {
    /// Maximum depth of the octree.
    pub max_depth: u32,
    /// Maximum items per leaf node before splitting.
    pub max_items_per_leaf: usize,
    /// Minimum node size (prevents infinite subdivision).
    pub min_node_size: f64,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_items_per_leaf: 16,
            min_node_size: 1e-4,
        }
    }
}

impl OctreeConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set how many items a leaf holds before it splits.
    pub fn with_max_items_per_leaf(mut self, items: usize) -> Self {
        self.max_items_per_leaf = items.max(1);
        self
    }

    /// Set the smallest node edge length that may still split.
    pub fn with_min_node_size(mut self, size: f64) -> Self {
        self.min_node_size = size;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Bounds {
    fn around(points: &[Point3<f64>]) -> Self {
        let mut min = Point3::from(Vector3::repeat(f64::MAX));
        let mut max = Point3::from(Vector3::repeat(f64::MIN));
        for p in points {
            min = min.inf(p);
            max = max.sup(p);
        }
        if points.is_empty() {
            min = Point3::origin();
            max = Point3::origin();
        }
        // Pad so points on the hull never sit exactly on a face
        let padding = (max - min) * 0.01 + Vector3::repeat(1e-3);
        Self {
            min: min - padding,
            max: max + padding,
        }
    }

    fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    fn smallest_side(&self) -> f64 {
        (self.max - self.min).min()
    }

    fn intersects_sphere(&self, center: &Point3<f64>, radius: f64) -> bool {
        let closest = center.sup(&self.min).inf(&self.max);
        (closest - center).norm_squared() <= radius * radius
    }

    fn octant_for_point(&self, point: &Point3<f64>) -> usize {
        let c = self.center();
        usize::from(point.x >= c.x) | usize::from(point.y >= c.y) << 1 | usize::from(point.z >= c.z) << 2
    }

    fn octant_bounds(&self, octant: usize) -> Bounds {
        let c = self.center();
        let pick = |bit: usize, low: f64, mid: f64, high: f64| {
            if octant & bit != 0 {
                (mid, high)
            } else {
                (low, mid)
            }
        };
        let (x0, x1) = pick(1, self.min.x, c.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, c.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, c.z, self.max.z);
        Bounds {
            min: Point3::new(x0, y0, z0),
            max: Point3::new(x1, y1, z1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Item {
    vertex: VertexId,
    position: Point3<f64>,
}

#[derive(Debug)]
enum Node {
    Leaf {
        bounds: Bounds,
        items: Vec<Item>,
    },
    Internal {
        bounds: Bounds,
        children: Box<[Option<Node>; 8]>,
    },
}

/// A spatial octree answering "which vertices lie within `r` of this point".
///
/// # Example
///
/// ```
/// use hedra::repair::VertexOctree;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
/// let octree = VertexOctree::from_points(&points);
/// assert_eq!(octree.query_sphere(&Point3::new(0.9, 0.0, 0.0), 0.2).len(), 1);
/// ```
#[derive(Debug)]
pub struct VertexOctree {
    root: Node,
    config: OctreeConfig,
    len: usize,
}

impl VertexOctree {
    /// Build an octree over `points`; item `i` is reported as `VertexId(i)`.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        Self::with_config(points, OctreeConfig::default())
    }

    /// Build an octree with a custom configuration.
    pub fn with_config(points: &[Point3<f64>], config: OctreeConfig) -> Self {
        let mut octree = Self {
            root: Node::Leaf {
                bounds: Bounds::around(points),
                items: Vec::with_capacity(points.len().min(config.max_items_per_leaf + 1)),
            },
            config,
            len: 0,
        };
        for (i, p) in points.iter().enumerate() {
            let item = Item {
                vertex: VertexId::new(i),
                position: *p,
            };
            Self::insert_into_node(&mut octree.root, item, 0, &octree.config);
            octree.len += 1;
        }
        octree
    }

    fn insert_into_node(node: &mut Node, item: Item, depth: u32, config: &OctreeConfig) {
        match node {
            Node::Leaf { bounds, items } => {
                items.push(item);
                if items.len() > config.max_items_per_leaf
                    && depth < config.max_depth
                    && bounds.smallest_side() > config.min_node_size * 2.0
                {
                    let old_items = std::mem::take(items);
                    *node = Node::Internal {
                        bounds: *bounds,
                        children: Box::new(Default::default()),
                    };
                    for item in old_items {
                        Self::insert_into_node(node, item, depth, config);
                    }
                }
            }
            Node::Internal { bounds, children } => {
                let octant = bounds.octant_for_point(&item.position);
                let child = children[octant].get_or_insert_with(|| Node::Leaf {
                    bounds: bounds.octant_bounds(octant),
                    items: Vec::new(),
                });
                Self::insert_into_node(child, item, depth + 1, config);
            }
        }
    }

    /// All vertices at distance `<= radius` from `center`, in no particular order.
    pub fn query_sphere(&self, center: &Point3<f64>, radius: f64) -> Vec<VertexId> {
        let mut results = Vec::new();
        Self::query_sphere_node(&self.root, center, radius, &mut results);
        results
    }

    fn query_sphere_node(node: &Node, center: &Point3<f64>, radius: f64, results: &mut Vec<VertexId>) {
        match node {
            Node::Leaf { bounds, items } => {
                if !bounds.intersects_sphere(center, radius) {
                    return;
                }
                let radius_sq = radius * radius;
                results.extend(
                    items
                        .iter()
                        .filter(|item| (item.position - center).norm_squared() <= radius_sq)
                        .map(|item| item.vertex),
                );
            }
            Node::Internal { bounds, children } => {
                if !bounds.intersects_sphere(center, radius) {
                    return;
                }
                for child in children.iter().flatten() {
                    Self::query_sphere_node(child, center, radius, results);
                }
            }
        }
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the octree holds no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The configuration this octree was built with.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }
}
