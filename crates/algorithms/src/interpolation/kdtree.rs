//! 2D k-d tree over sample positions
//!
//! Backs the optional IDW search neighborhood (k nearest samples and/or a
//! search radius). Indices in query results refer to the caller's original
//! sample slice, so ties can be broken by input order.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SamplePoint;

/// A 2D k-d tree for spatial queries on sample points.
#[derive(Debug)]
pub struct KdTree {
    /// Nodes in implicit layout: the subtree over `order[lo..hi]` is rooted at
    /// its median `mid = (lo + hi) / 2`
    order: Vec<usize>,
    points: Vec<SamplePoint>,
}

/// Result of a neighbor query
#[derive(Debug, Clone, Copy)]
pub struct NearestResult {
    pub point: SamplePoint,
    pub distance_sq: f64,
    /// Position of the point in the slice the tree was built from
    pub index: usize,
}

/// Max-heap entry keyed by (distance, index)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance_sq: f64,
    index: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

impl KdTree {
    /// Build a tree from sample points in O(n log n).
    pub fn build(points: &[SamplePoint]) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        partition(points, &mut order, 0);
        Self {
            order,
            points: points.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Up to `k` nearest points, sorted by ascending distance then input index.
    pub fn k_nearest(&self, qx: f64, qy: f64, k: usize) -> Vec<NearestResult> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.knn_recursive(0, self.order.len(), 0, qx, qy, k, &mut heap);
        self.collect_results(heap.into_sorted_vec())
    }

    /// All points within `radius` (inclusive), sorted like [`KdTree::k_nearest`].
    pub fn within_radius(&self, qx: f64, qy: f64, radius: f64) -> Vec<NearestResult> {
        if self.is_empty() || !(radius > 0.0) {
            return Vec::new();
        }

        let mut found = Vec::new();
        self.radius_recursive(0, self.order.len(), 0, qx, qy, radius * radius, &mut found);
        found.sort();
        self.collect_results(found)
    }

    fn collect_results(&self, candidates: Vec<Candidate>) -> Vec<NearestResult> {
        candidates
            .into_iter()
            .map(|c| NearestResult {
                point: self.points[c.index],
                distance_sq: c.distance_sq,
                index: c.index,
            })
            .collect()
    }

    /// Signed offset of the query from the node's splitting line
    fn split_offset(&self, idx: usize, depth: usize, qx: f64, qy: f64) -> f64 {
        let p = &self.points[idx];
        if depth % 2 == 0 {
            qx - p.x
        } else {
            qy - p.y
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn knn_recursive(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        qx: f64,
        qy: f64,
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let idx = self.order[mid];

        let candidate = Candidate {
            distance_sq: self.points[idx].dist_sq(qx, qy),
            index: idx,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let diff = self.split_offset(idx, depth, qx, qy);
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.knn_recursive(near.0, near.1, depth + 1, qx, qy, k, heap);

        let bound = if heap.len() < k {
            f64::INFINITY
        } else {
            heap.peek().map_or(f64::INFINITY, |c| c.distance_sq)
        };
        if diff * diff <= bound {
            self.knn_recursive(far.0, far.1, depth + 1, qx, qy, k, heap);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn radius_recursive(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        qx: f64,
        qy: f64,
        radius_sq: f64,
        found: &mut Vec<Candidate>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let idx = self.order[mid];

        let distance_sq = self.points[idx].dist_sq(qx, qy);
        if distance_sq <= radius_sq {
            found.push(Candidate { distance_sq, index: idx });
        }

        let diff = self.split_offset(idx, depth, qx, qy);
        if diff <= 0.0 || diff * diff <= radius_sq {
            self.radius_recursive(lo, mid, depth + 1, qx, qy, radius_sq, found);
        }
        if diff >= 0.0 || diff * diff <= radius_sq {
            self.radius_recursive(mid + 1, hi, depth + 1, qx, qy, radius_sq, found);
        }
    }
}

/// Arrange `order` so each subrange's median splits it on alternating axes.
fn partition(points: &[SamplePoint], order: &mut [usize], depth: usize) {
    if order.len() <= 1 {
        return;
    }
    let mid = order.len() / 2;
    let key = |i: &usize| {
        if depth % 2 == 0 {
            points[*i].x
        } else {
            points[*i].y
        }
    };
    order.select_nth_unstable_by(mid, |a, b| key(a).total_cmp(&key(b)));

    let (left, right) = order.split_at_mut(mid);
    partition(points, left, depth + 1);
    partition(points, &mut right[1..], depth + 1);
}
