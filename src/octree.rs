use std::collections::HashSet;

use crate::aabb::Aabb;
use crate::point::Point;
use crate::ray::Ray;

/// Near-planar hits slip into the adjacent octant rather than being missed at
/// a split boundary (§4.E).
const BOUNDARY_MARGIN: f64 = 1e-4;

/// Adaptive spatial index over a fixed list of world-space AABBs, addressed by
/// position in that list. Used both for the scene-level index over objects
/// and, internally, for a mesh's index over its own triangles — stylistically
/// grounded on the recursive boxed-node shape of `kdtree.rs`'s `Tree<T>`,
/// generalized from a binary median split to an eight-way AABB-midplane one.
pub struct Octree {
    bounds: Vec<Aabb>,
    root: Node,
    /// Entries with no computable AABB: always tested, never routed (§3).
    unbounded: Vec<usize>,
}

enum Node {
    Leaf(Vec<usize>),
    Branch(Box<[Node; 8]>, [Aabb; 8]),
}

impl Octree {
    /// `bounds` is indexed by the same handle the caller will use to look up
    /// its own shape/triangle list; entries for which `object_aabb` was
    /// `None` go in `unbounded` instead and are passed in separately.
    pub fn build(bounds: Vec<Aabb>, unbounded: Vec<usize>, split_threshold: usize) -> Octree {
        if bounds.is_empty() {
            return Octree { bounds, root: Node::Leaf(Vec::new()), unbounded };
        }
        let root_bounds = bounds
            .iter()
            .skip(1)
            .fold(bounds[0], |acc, b| acc.union(b));
        let items: Vec<usize> = (0..bounds.len()).collect();
        let root = Node::build(&bounds, items, root_bounds, split_threshold);
        Octree { bounds, root, unbounded }
    }

    /// Every candidate index whose AABB the ray might intersect, deduplicated,
    /// plus every unbounded entry. Order is unspecified; for a shadow ray use
    /// `candidates_sorted_by_distance` instead.
    pub fn candidates(&self, ray: &Ray) -> Vec<usize> {
        let mut seen = HashSet::new();
        self.root.collect(ray, &mut seen);
        let mut out: Vec<usize> = seen.into_iter().collect();
        out.extend(self.unbounded.iter().copied());
        out
    }

    /// Candidates ordered by squared distance from `origin` to each entry's
    /// AABB centre, so a shadow-ray caller can stop at the first qualifying
    /// hit (§4.E, §4.F).
    pub fn candidates_sorted_by_distance(&self, ray: &Ray, origin: Point) -> Vec<usize> {
        let mut out = self.candidates(ray);
        out.sort_by(|&a, &b| {
            let da = self.bounds.get(a).map(|b| b.center_distance_squared(origin)).unwrap_or(0.0);
            let db = self.bounds.get(b).map(|b| b.center_distance_squared(origin)).unwrap_or(0.0);
            da.partial_cmp(&db).unwrap()
        });
        out
    }
}

impl Node {
    fn build(bounds: &[Aabb], items: Vec<usize>, region: Aabb, split_threshold: usize) -> Node {
        if items.len() <= split_threshold {
            return Node::Leaf(items);
        }

        let mid = region.midpoint();
        let child_regions = octants(&region, mid);
        let mut child_items: [Vec<usize>; 8] = Default::default();
        for &i in &items {
            let expanded = expand(bounds[i]);
            for (c, child_region) in child_regions.iter().enumerate() {
                if expanded.overlaps(child_region) {
                    child_items[c].push(i);
                }
            }
        }

        // If every child ends up with the same (or more) items as the parent,
        // splitting accomplishes nothing — stop here rather than recursing forever.
        if !child_items.iter().any(|c| c.len() < items.len()) {
            return Node::Leaf(items);
        }

        let mut children: Vec<Node> = Vec::with_capacity(8);
        for (c, region) in child_regions.iter().enumerate() {
            let taken = std::mem::take(&mut child_items[c]);
            children.push(Node::build(bounds, taken, *region, split_threshold));
        }
        let children: [Node; 8] = match children.try_into() {
            Ok(arr) => arr,
            Err(_) => unreachable!("exactly eight octants were pushed"),
        };
        Node::Branch(Box::new(children), child_regions)
    }

    fn collect(&self, ray: &Ray, out: &mut HashSet<usize>) {
        match self {
            Node::Leaf(items) => out.extend(items.iter().copied()),
            Node::Branch(children, regions) => {
                for (child, region) in children.iter().zip(regions.iter()) {
                    if expand(*region).intersects(ray) {
                        child.collect(ray, out);
                    }
                }
            }
        }
    }
}

fn expand(b: Aabb) -> Aabb {
    let m = Point::new(BOUNDARY_MARGIN, BOUNDARY_MARGIN, BOUNDARY_MARGIN);
    Aabb::new(b.min - m.to_dir(), b.max + m.to_dir())
}

fn octants(region: &Aabb, mid: Point) -> [Aabb; 8] {
    let lo = |axis_min: f64, axis_mid: f64| (axis_min, axis_mid);
    let hi = |axis_mid: f64, axis_max: f64| (axis_mid, axis_max);
    let (xlo, xhi) = (lo(region.min.x, mid.x), hi(mid.x, region.max.x));
    let (ylo, yhi) = (lo(region.min.y, mid.y), hi(mid.y, region.max.y));
    let (zlo, zhi) = (lo(region.min.z, mid.z), hi(mid.z, region.max.z));
    let axes_x = [xlo, xhi];
    let axes_y = [ylo, yhi];
    let axes_z = [zlo, zhi];

    let mut out = [Aabb::new(Point::zero(), Point::zero()); 8];
    let mut idx = 0;
    for x in &axes_x {
        for y in &axes_y {
            for z in &axes_z {
                out[idx] = Aabb::new(Point::new(x.0, y.0, z.0), Point::new(x.1, y.1, z.1));
                idx += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    fn unit_box_at(x: f64) -> Aabb {
        Aabb::new(Point::new(x - 0.5, -0.5, -0.5), Point::new(x + 0.5, 0.5, 0.5))
    }

    #[test]
    fn small_count_stays_a_leaf() {
        let bounds = vec![unit_box_at(0.0), unit_box_at(1.0)];
        let tree = Octree::build(bounds, Vec::new(), 20);
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let mut cands = tree.candidates(&r);
        cands.sort();
        assert_eq!(cands, vec![0, 1]);
    }

    #[test]
    fn splits_past_threshold_and_still_finds_hits() {
        let bounds: Vec<Aabb> = (0..40).map(|i| unit_box_at(i as f64 * 3.0)).collect();
        let tree = Octree::build(bounds, Vec::new(), 4);
        let r = Ray::primary(Point::new(30.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let cands = tree.candidates(&r);
        assert!(cands.contains(&10));
    }

    #[test]
    fn unbounded_entries_always_returned() {
        let bounds = vec![unit_box_at(100.0)];
        let tree = Octree::build(bounds, vec![7], 20);
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(tree.candidates(&r).contains(&7));
    }

    #[test]
    fn sorted_by_distance_orders_nearest_first() {
        let bounds = vec![unit_box_at(5.0), unit_box_at(1.0), unit_box_at(3.0)];
        let tree = Octree::build(bounds, Vec::new(), 20);
        let r = Ray::primary(Point::new(-10.0, 0.0, 0.0), Direction::new(1.0, 0.0, 0.0));
        let sorted = tree.candidates_sorted_by_distance(&r, Point::zero());
        assert_eq!(sorted, vec![1, 2, 0]);
    }
}
