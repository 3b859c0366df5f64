//! Sorting helpers and the distance-annotated vertex sequence.
//!
//! `quick_sort` partitions down to small runs and finishes them with an
//! insertion sort; the rasterizer uses it for its edge table and
//! `insertion_sort` for the nearly sorted active list. `VertexSequence`
//! drops coincident points as vertices arrive and is what the dash and
//! stroke generators accumulate into.

use crate::math::VERTEX_DIST_EPSILON;
use crate::point::Point;

// ============================================================================
// Sorting
// ============================================================================

/// Partitions at or below this length are finished with insertion sort.
pub const QUICK_SORT_THRESHOLD: usize = 9;

/// Sort a mutable slice with an explicit-stack quicksort.
///
/// Not stable. Callers that need a total order break ties inside `less`.
pub fn quick_sort<T, F>(arr: &mut [T], less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    if arr.len() < 2 {
        return;
    }

    let mut stack = [0usize; 80];
    let mut top: usize = 0;
    let mut limit = arr.len();
    let mut base = 0usize;

    loop {
        let len = limit - base;

        if len > QUICK_SORT_THRESHOLD {
            let pivot = base + len / 2;
            arr.swap(base, pivot);

            let mut i = base + 1;
            let mut j = limit - 1;

            // arr[i] <= arr[base] <= arr[j]
            if less(&arr[j], &arr[i]) {
                arr.swap(j, i);
            }
            if less(&arr[base], &arr[i]) {
                arr.swap(base, i);
            }
            if less(&arr[j], &arr[base]) {
                arr.swap(j, base);
            }

            loop {
                loop {
                    i += 1;
                    if !less(&arr[i], &arr[base]) {
                        break;
                    }
                }
                loop {
                    j -= 1;
                    if !less(&arr[base], &arr[j]) {
                        break;
                    }
                }
                if i > j {
                    break;
                }
                arr.swap(i, j);
            }

            arr.swap(base, j);

            // push the larger sub-array, keep working on the smaller
            if j - base > limit - i {
                stack[top] = base;
                stack[top + 1] = j;
                base = i;
            } else {
                stack[top] = i;
                stack[top + 1] = limit;
                limit = j;
            }
            top += 2;
        } else {
            insertion_sort(&mut arr[base..limit], less);

            if top > 0 {
                top -= 2;
                base = stack[top];
                limit = stack[top + 1];
            } else {
                break;
            }
        }
    }
}

/// Stable insertion sort. Linear on input that is already nearly in order.
pub fn insertion_sort<T, F>(arr: &mut [T], less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    for i in 1..arr.len() {
        let mut j = i;
        while j > 0 && less(&arr[j], &arr[j - 1]) {
            arr.swap(j, j - 1);
            j -= 1;
        }
    }
}

// ============================================================================
// Vertex dist
// ============================================================================

/// A vertex together with the distance to the vertex that follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDist {
    pub pt: Point,
    pub dist: f64,
}

impl VertexDist {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pt: Point::new(x, y),
            dist: 0.0,
        }
    }

    pub fn from_point(pt: Point) -> Self {
        Self { pt, dist: 0.0 }
    }

    /// Store the distance to `val`. Returns `false` for coincident points,
    /// whose distance is then set to `1 / VERTEX_DIST_EPSILON`.
    pub fn calc_dist(&mut self, val: &VertexDist) -> bool {
        self.dist = self.pt.distance(val.pt);
        let ret = self.dist > VERTEX_DIST_EPSILON;
        if !ret {
            self.dist = 1.0 / VERTEX_DIST_EPSILON;
        }
        ret
    }
}

// ============================================================================
// Vertex sequence
// ============================================================================

/// A sequence of vertices that filters coincident points.
///
/// The check is lazy: a vertex coincident with its predecessor is removed
/// when the next vertex arrives, or by `close`.
#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add(&mut self, val: VertexDist) {
        let len = self.vertices.len();
        if len > 1 {
            let last = self.vertices[len - 1];
            if !self.vertices[len - 2].calc_dist(&last) {
                self.vertices.pop();
            }
        }
        self.vertices.push(val);
    }

    pub fn modify_last(&mut self, val: VertexDist) {
        self.vertices.pop();
        self.add(val);
    }

    /// Finish the sequence: drop trailing coincident vertices and, when
    /// `closed`, vertices coincident with the first. Distances are valid
    /// afterwards (the last one wraps to the first vertex when closed).
    pub fn close(&mut self, closed: bool) {
        while self.vertices.len() > 1 {
            let len = self.vertices.len();
            let last = self.vertices[len - 1];
            if self.vertices[len - 2].calc_dist(&last) {
                break;
            }
            self.vertices.pop();
            self.modify_last(last);
        }

        if closed {
            while self.vertices.len() > 1 {
                let len = self.vertices.len();
                let first = self.vertices[0];
                if self.vertices[len - 1].calc_dist(&first) {
                    break;
                }
                self.vertices.pop();
            }
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn as_slice(&self) -> &[VertexDist] {
        &self.vertices
    }
}

impl core::ops::Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_sort_basic() {
        let mut arr = [5, 3, 8, 1, 9, 2, 7, 4, 6, 0];
        quick_sort(&mut arr, &|a: &i32, b: &i32| *a < *b);
        assert_eq!(arr, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_quick_sort_empty_and_single() {
        let mut empty: [i32; 0] = [];
        quick_sort(&mut empty, &|a: &i32, b: &i32| *a < *b);

        let mut single = [42];
        quick_sort(&mut single, &|a: &i32, b: &i32| *a < *b);
        assert_eq!(single, [42]);
    }

    #[test]
    fn test_quick_sort_large_with_duplicates() {
        let mut arr: Vec<i32> = (0..300).map(|i| (i * 7919) % 101).collect();
        let mut expected = arr.clone();
        expected.sort();
        quick_sort(&mut arr, &|a: &i32, b: &i32| *a < *b);
        assert_eq!(arr, expected);
    }

    #[test]
    fn test_insertion_sort_is_stable() {
        let mut arr = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        insertion_sort(&mut arr, &|a: &(i32, char), b: &(i32, char)| a.0 < b.0);
        assert_eq!(arr, [(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_vertex_dist() {
        let mut v1 = VertexDist::new(0.0, 0.0);
        assert!(v1.calc_dist(&VertexDist::new(3.0, 4.0)));
        assert!((v1.dist - 5.0).abs() < 1e-10);
        assert!(!v1.calc_dist(&VertexDist::new(0.0, 0.0)));
        assert_eq!(v1.dist, 1.0 / VERTEX_DIST_EPSILON);
    }

    #[test]
    fn test_vertex_sequence_removes_coincident() {
        let mut seq = VertexSequence::new();
        seq.add(VertexDist::new(0.0, 0.0));
        seq.add(VertexDist::new(1.0, 0.0));
        seq.add(VertexDist::new(1.0, 0.0));
        assert_eq!(seq.size(), 3);
        seq.add(VertexDist::new(2.0, 0.0));
        assert_eq!(seq.size(), 3);
    }

    #[test]
    fn test_vertex_sequence_close() {
        let mut seq = VertexSequence::new();
        seq.add(VertexDist::new(0.0, 0.0));
        seq.add(VertexDist::new(1.0, 0.0));
        seq.add(VertexDist::new(0.0, 0.0));
        seq.close(true);
        assert_eq!(seq.size(), 2);
        assert!((seq[1].dist - 1.0).abs() < 1e-12);
    }
}
