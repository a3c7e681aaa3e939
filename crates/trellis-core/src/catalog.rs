//! The shape-catalog seam.
//!
//! The core pipeline never draws shapes; it only needs their geometry.
//! For every distinct shape reference in a document, the layout engine
//! asks an external registry for a bounding box and an ordered anchor
//! set through the [`ShapeCatalog`] trait.
//!
//! [`BasicCatalog`] is the built-in registry: a text-sized box with the
//! four compass anchors. It keeps the pipeline usable without a full
//! shape library and is what the test suites run against.

use crate::{
    geometry::{Point, Size},
    identifier::Id,
    value::ValueMap,
};

/// A named point on a node's boundary where an edge may attach.
///
/// `offset` is fractional: `(0.0, 0.0)` is the node's top-left corner,
/// `(1.0, 1.0)` the bottom-right, `(0.5, 0.0)` the middle of the top
/// edge. The layout engine scales it by the node's resolved size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub name: Id,
    pub offset: Point,
}

impl Anchor {
    pub fn new(name: &str, fx: f32, fy: f32) -> Self {
        Self {
            name: Id::new(name),
            offset: Point::new(fx, fy),
        }
    }
}

/// The node-side context handed to the catalog when resolving geometry.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    /// Display text the node will carry (label or id).
    pub label: &'a str,
    /// The node's open attribute bag.
    pub data: &'a ValueMap,
}

/// External registry of shape geometry.
///
/// Implementations must be deterministic: identical inputs produce
/// identical bounds and anchor sets, in a stable order.
pub trait ShapeCatalog {
    /// Bounding box for one node of the given shape.
    fn bounds(&self, shape: Id, ctx: &NodeContext<'_>) -> Size;

    /// Ordered anchor set for the shape. May be empty, in which case
    /// edges attach to the box center.
    fn anchors(&self, shape: Id, ctx: &NodeContext<'_>) -> Vec<Anchor>;
}

/// The built-in geometry-only catalog.
///
/// Every shape is a box sized from its label text with the four compass
/// anchors. Width scales with label length using a fixed per-character
/// advance; explicit `width`/`height` entries in the node's data bag
/// override the estimate.
#[derive(Debug, Clone)]
pub struct BasicCatalog {
    char_width: f32,
    min_size: Size,
    text_padding: f32,
}

impl BasicCatalog {
    pub fn new() -> Self {
        Self {
            char_width: 8.0,
            min_size: Size::new(60.0, 40.0),
            text_padding: 16.0,
        }
    }
}

impl Default for BasicCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeCatalog for BasicCatalog {
    fn bounds(&self, _shape: Id, ctx: &NodeContext<'_>) -> Size {
        let text_width = ctx.label.chars().count() as f32 * self.char_width;
        let mut width = (text_width + self.text_padding).max(self.min_size.width());
        let mut height = self.min_size.height();

        if let Some(w) = ctx.data.get("width").and_then(|v| v.as_number()) {
            width = w as f32;
        }
        if let Some(h) = ctx.data.get("height").and_then(|v| v.as_number()) {
            height = h as f32;
        }

        Size::new(width, height)
    }

    fn anchors(&self, _shape: Id, _ctx: &NodeContext<'_>) -> Vec<Anchor> {
        vec![
            Anchor::new("north", 0.5, 0.0),
            Anchor::new("east", 1.0, 0.5),
            Anchor::new("south", 0.5, 1.0),
            Anchor::new("west", 0.0, 0.5),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn ctx<'a>(label: &'a str, data: &'a ValueMap) -> NodeContext<'a> {
        NodeContext { label, data }
    }

    #[test]
    fn test_bounds_scale_with_label() {
        let catalog = BasicCatalog::new();
        let data = ValueMap::new();
        let shape = Id::new("box");

        let short = catalog.bounds(shape, &ctx("ab", &data));
        let long = catalog.bounds(shape, &ctx("a much longer label", &data));
        assert!(long.width() > short.width());
        assert_approx_eq!(f32, short.width(), 60.0); // clamped to minimum
    }

    #[test]
    fn test_bounds_data_override() {
        use crate::value::Value;

        let catalog = BasicCatalog::new();
        let mut data = ValueMap::new();
        data.insert("width".into(), Value::Number(120.0));
        data.insert("height".into(), Value::Number(80.0));

        let size = catalog.bounds(Id::new("box"), &ctx("x", &data));
        assert_approx_eq!(f32, size.width(), 120.0);
        assert_approx_eq!(f32, size.height(), 80.0);
    }

    #[test]
    fn test_compass_anchors() {
        let catalog = BasicCatalog::new();
        let data = ValueMap::new();
        let anchors = catalog.anchors(Id::new("box"), &ctx("x", &data));

        assert_eq!(anchors.len(), 4);
        assert_eq!(anchors[0].name, "north");
        assert_eq!(anchors[2].name, "south");
        assert_approx_eq!(f32, anchors[1].offset.x(), 1.0);
        assert_approx_eq!(f32, anchors[1].offset.y(), 0.5);
    }
}
