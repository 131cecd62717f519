//! Quadtree over axis-aligned boxes, keyed by value equality.
//!
//! Items are stored with the box they were inserted under; removal takes the
//! same box plus an equal value. Items whose box straddles child quadrants
//! (or has NaN extents, e.g. the circumcircle box of a degenerate triangle)
//! stay on an interior node, so they are always reachable again.

use crate::geometry::BoundingBox;

const NODE_CAPACITY: usize = 16;
const MAX_DEPTH: usize = 12;

/// Spatial index over 2D boxes with value-equality removal.
#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    root: Node<T>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: BoundingBox,
    depth: usize,
    items: Vec<(BoundingBox, T)>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T: Clone + PartialEq> Quadtree<T> {
    /// Empty tree over the given extent. Boxes outside the extent are still
    /// accepted; they accumulate on the root.
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            root: Node::new(bounds, 0),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, bounds: BoundingBox, item: T) {
        self.root.insert(bounds, item);
        self.len += 1;
    }

    /// Remove one item equal to `item`, guided by the box it was inserted
    /// under. Returns false when no equal item is found.
    pub fn remove(&mut self, bounds: &BoundingBox, item: &T) -> bool {
        if self.root.remove(bounds, item) {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// All items whose stored box intersects the search box.
    pub fn query(&self, search: &BoundingBox) -> Vec<T> {
        let mut found = Vec::new();
        self.root.visit(search, &mut |item| found.push(item.clone()));
        found
    }

    /// Like [`Quadtree::query`], keeping only items that pass the filter.
    pub fn query_filtered(&self, search: &BoundingBox, filter: impl Fn(&T) -> bool) -> Vec<T> {
        let mut found = Vec::new();
        self.root.visit(search, &mut |item| {
            if filter(item) {
                found.push(item.clone());
            }
        });
        found
    }

    /// Visit every stored item.
    pub fn for_each(&self, mut action: impl FnMut(&T)) {
        self.root.for_each(&mut action);
    }

    /// Every stored item, in tree order.
    pub fn items(&self) -> Vec<T> {
        let mut all = Vec::with_capacity(self.len);
        self.for_each(|item| all.push(item.clone()));
        all
    }
}

impl<T: Clone + PartialEq> Node<T> {
    fn new(bounds: BoundingBox, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, bounds: BoundingBox, item: T) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_box(&bounds) {
                    child.insert(bounds, item);
                    return;
                }
            }
            self.items.push((bounds, item));
            return;
        }
        self.items.push((bounds, item));
        if self.items.len() > NODE_CAPACITY && self.depth < MAX_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let mid_x = (self.bounds.min_x + self.bounds.max_x) / 2.0;
        let mid_y = (self.bounds.min_y + self.bounds.max_y) / 2.0;
        let quadrants = [
            BoundingBox::new(self.bounds.min_x, self.bounds.min_y, mid_x, mid_y),
            BoundingBox::new(mid_x, self.bounds.min_y, self.bounds.max_x, mid_y),
            BoundingBox::new(self.bounds.min_x, mid_y, mid_x, self.bounds.max_y),
            BoundingBox::new(mid_x, mid_y, self.bounds.max_x, self.bounds.max_y),
        ];
        let depth = self.depth + 1;
        let mut children = Box::new(quadrants.map(|q| Node::new(q, depth)));
        let items = std::mem::take(&mut self.items);
        for (bounds, item) in items {
            let mut placed = false;
            for child in children.iter_mut() {
                if child.bounds.contains_box(&bounds) {
                    child.insert(bounds, item.clone());
                    placed = true;
                    break;
                }
            }
            if !placed {
                self.items.push((bounds, item));
            }
        }
        self.children = Some(children);
    }

    fn remove(&mut self, bounds: &BoundingBox, item: &T) -> bool {
        if let Some(pos) = self.items.iter().position(|(_, stored)| stored == item) {
            self.items.swap_remove(pos);
            return true;
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_box(bounds) {
                    return child.remove(bounds, item);
                }
            }
        }
        false
    }

    fn visit(&self, search: &BoundingBox, action: &mut impl FnMut(&T)) {
        for (bounds, item) in &self.items {
            if bounds.intersects(search) {
                action(item);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                if child.bounds.intersects(search) {
                    child.visit(search, action);
                }
            }
        }
    }

    fn for_each(&self, action: &mut impl FnMut(&T)) {
        for (_, item) in &self.items {
            action(item);
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.for_each(action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(x: f64, y: f64) -> BoundingBox {
        BoundingBox::new(x, y, x + 1.0, y + 1.0)
    }

    #[test]
    fn insert_query_remove_round_trip() {
        let mut tree = Quadtree::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        tree.insert(unit_box(10.0, 10.0), 1usize);
        tree.insert(unit_box(50.0, 50.0), 2usize);
        tree.insert(unit_box(90.0, 90.0), 3usize);
        assert_eq!(tree.len(), 3);

        let hits = tree.query(&BoundingBox::new(9.0, 9.0, 12.0, 12.0));
        assert_eq!(hits, vec![1]);

        assert!(tree.remove(&unit_box(50.0, 50.0), &2));
        assert!(!tree.remove(&unit_box(50.0, 50.0), &2));
        assert_eq!(tree.len(), 2);
        assert!(tree.query(&BoundingBox::new(0.0, 0.0, 100.0, 100.0)).len() == 2);
    }

    #[test]
    fn removal_after_split() {
        let mut tree = Quadtree::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..100 {
            let x = (i % 10) as f64 * 10.0;
            let y = (i / 10) as f64 * 10.0;
            tree.insert(unit_box(x, y), i);
        }
        assert_eq!(tree.len(), 100);
        for i in 0..100 {
            let x = (i % 10) as f64 * 10.0;
            let y = (i / 10) as f64 * 10.0;
            assert!(tree.remove(&unit_box(x, y), &i), "item {i} not removed");
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn straddling_and_nan_boxes_stay_reachable() {
        let mut tree = Quadtree::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..50 {
            tree.insert(unit_box(i as f64, i as f64), i);
        }
        // A box spanning all quadrants.
        let wide = BoundingBox::new(-10.0, -10.0, 110.0, 110.0);
        tree.insert(wide, 1000usize);
        // A degenerate box, e.g. from a collinear triangle's circumcircle.
        let nan = BoundingBox::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        tree.insert(nan, 2000usize);

        let hits = tree.query(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert!(hits.contains(&1000));
        assert!(!hits.contains(&2000));
        assert!(tree.remove(&wide, &1000));
        assert!(tree.remove(&nan, &2000));
    }

    #[test]
    fn query_filtered_applies_predicate() {
        let mut tree = Quadtree::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        tree.insert(unit_box(1.0, 1.0), 1usize);
        tree.insert(unit_box(1.2, 1.2), 2usize);
        let odd = tree.query_filtered(&BoundingBox::new(0.0, 0.0, 10.0, 10.0), |v| v % 2 == 1);
        assert_eq!(odd, vec![1]);
    }
}
