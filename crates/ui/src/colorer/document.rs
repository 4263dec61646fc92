use anyhow::{Context as _, Result, bail};
use gpui::{Hsla, hsla};
use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Shape as _, Size};
use roxmltree::Node;
use smallvec::SmallVec;

use crate::color::parse_color;

/// The drawable element kinds recognized inside a loaded document.
///
/// Anything else (text, gradients, ellipses) is ignored; raster `image`
/// elements are recorded separately and never participate in interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Polygon,
    Path,
    Circle,
    Rect,
}

impl ShapeKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "polygon" => Some(Self::Polygon),
            "path" => Some(Self::Path),
            "circle" => Some(Self::Circle),
            "rect" => Some(Self::Rect),
            _ => None,
        }
    }
}

/// One drawable unit of the document, in document coordinates.
#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    outline: BezPath,
    base_fill: Option<Hsla>,
    fill_override: Option<Hsla>,
    stroke: Option<(Hsla, f64)>,
}

impl Shape {
    /// The fill this shape currently paints with: the click-applied override
    /// if any, else the fill the document declared. `None` paints nothing.
    pub fn fill(&self) -> Option<Hsla> {
        self.fill_override.or(self.base_fill)
    }

    pub fn outline(&self) -> &BezPath {
        &self.outline
    }

    pub fn stroke(&self) -> Option<(Hsla, f64)> {
        self.stroke
    }
}

/// Inherited presentation attributes, resolved while walking the tree.
#[derive(Debug, Clone, Copy)]
struct PaintAttrs {
    fill: Option<Hsla>,
    stroke: Option<Hsla>,
    stroke_width: f64,
}

impl PaintAttrs {
    fn root() -> Self {
        Self {
            // SVG paints un-attributed shapes black.
            fill: Some(hsla(0., 0., 0., 1.)),
            stroke: None,
            stroke_width: 1.,
        }
    }

    fn merged(&self, node: &Node) -> Self {
        let mut merged = *self;
        if let Some(value) = paint_property(node, "fill") {
            merged.fill = match value.as_str() {
                "none" => None,
                other => parse_color(other).or(merged.fill),
            };
        }
        if let Some(value) = paint_property(node, "stroke") {
            merged.stroke = match value.as_str() {
                "none" => None,
                other => parse_color(other).or(merged.stroke),
            };
        }
        if let Some(value) = paint_property(node, "stroke-width") {
            if let Ok(width) = value.trim_end_matches("px").parse::<f64>() {
                merged.stroke_width = width;
            }
        }
        merged
    }

    fn stroke_paint(&self) -> Option<(Hsla, f64)> {
        self.stroke
            .filter(|_| self.stroke_width > 0.)
            .map(|color| (color, self.stroke_width))
    }
}

/// A presentation property from the `style` attribute, else the attribute of
/// the same name. The `style` attribute wins, per CSS.
fn paint_property(node: &Node, name: &str) -> Option<String> {
    if let Some(style) = node.attribute("style") {
        for declaration in style.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                if property.trim() == name {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    node.attribute(name).map(|value| value.trim().to_string())
}

/// A parsed vector document: viewport size, drawable shapes in paint order,
/// and the bounds of any raster sub-images (excluded from interaction).
#[derive(Debug, Clone, Default)]
pub struct VectorDocument {
    size: Size,
    shapes: SmallVec<[Shape; 8]>,
    rasters: SmallVec<[Rect; 2]>,
}

impl VectorDocument {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).context("document is not valid UTF-8")?;
        let xml = roxmltree::Document::parse(text).context("malformed XML")?;
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            bail!("root element is <{}>, not <svg>", root.tag_name().name());
        }

        let mut document = VectorDocument::default();
        let mut root_transform = Affine::IDENTITY;

        if let Some(view_box) = root.attribute("viewBox").and_then(parse_view_box) {
            let (min_x, min_y, width, height) = view_box;
            document.size = Size::new(width, height);
            root_transform = Affine::translate((-min_x, -min_y));
        } else {
            let length = |name| {
                root.attribute(name)
                    .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
            };
            if let (Some(width), Some(height)) = (length("width"), length("height")) {
                document.size = Size::new(width, height);
            }
        }

        document.collect(&root, root_transform, PaintAttrs::root());

        if document.size == Size::ZERO {
            // No declared viewport; fall back to the extent of the content.
            let extent = document
                .shapes
                .iter()
                .map(|shape| shape.outline.bounding_box())
                .chain(document.rasters.iter().copied())
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO);
            document.size = Size::new(extent.max_x().max(0.), extent.max_y().max(0.));
        }

        Ok(document)
    }

    fn collect(&mut self, node: &Node, transform: Affine, inherited: PaintAttrs) {
        for child in node.children().filter(Node::is_element) {
            let transform = transform * parse_transform(child.attribute("transform"));
            let paint = inherited.merged(&child);

            match child.tag_name().name() {
                "g" | "a" | "svg" => self.collect(&child, transform, paint),
                "image" => {
                    let attr = |name| {
                        child
                            .attribute(name)
                            .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
                    };
                    let x = attr("x").unwrap_or(0.);
                    let y = attr("y").unwrap_or(0.);
                    if let (Some(width), Some(height)) = (attr("width"), attr("height")) {
                        let rect = Rect::new(x, y, x + width, y + height);
                        self.rasters.push(transform.transform_rect_bbox(rect));
                    }
                }
                tag => {
                    let Some(kind) = ShapeKind::from_tag(tag) else {
                        continue;
                    };
                    match build_outline(kind, &child) {
                        Some(mut outline) => {
                            outline.apply_affine(transform);
                            self.shapes.push(Shape {
                                kind,
                                outline,
                                base_fill: paint.fill,
                                fill_override: None,
                                stroke: paint.stroke_paint(),
                            });
                        }
                        None => {
                            tracing::debug!(tag, "skipping shape with unusable geometry");
                        }
                    }
                }
            }
        }
    }

    /// The declared (or inferred) viewport size, in document units.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn rasters(&self) -> &[Rect] {
        &self.rasters
    }

    /// The topmost shape containing `point` (document coordinates), if any.
    /// Raster sub-images are transparent to hit-testing.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.shapes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, shape)| shape.outline.contains(point))
            .map(|(index, _)| index)
    }

    /// Override the fill of one shape. `None` reverts to the document fill.
    pub fn set_fill(&mut self, index: usize, fill: Option<Hsla>) {
        if let Some(shape) = self.shapes.get_mut(index) {
            shape.fill_override = fill;
        }
    }

    /// Override the fill of every shape.
    pub fn fill_all(&mut self, fill: Option<Hsla>) {
        for shape in &mut self.shapes {
            shape.fill_override = fill;
        }
    }
}

fn parse_view_box(value: &str) -> Option<(f64, f64, f64, f64)> {
    let mut numbers = value
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>());
    let mut next = || numbers.next()?.ok();
    Some((next()?, next()?, next()?, next()?))
}

fn build_outline(kind: ShapeKind, node: &Node) -> Option<BezPath> {
    let attr = |name| {
        node.attribute(name)
            .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
    };

    match kind {
        ShapeKind::Path => {
            let data = node.attribute("d")?;
            BezPath::from_svg(data).ok()
        }
        ShapeKind::Circle => {
            let cx = attr("cx").unwrap_or(0.);
            let cy = attr("cy").unwrap_or(0.);
            let r = attr("r")?;
            (r > 0.).then(|| Circle::new((cx, cy), r).to_path(0.01))
        }
        ShapeKind::Rect => {
            let x = attr("x").unwrap_or(0.);
            let y = attr("y").unwrap_or(0.);
            let width = attr("width")?;
            let height = attr("height")?;
            if width <= 0. || height <= 0. {
                return None;
            }
            let rect = Rect::new(x, y, x + width, y + height);
            match attr("rx").or_else(|| attr("ry")) {
                Some(radius) if radius > 0. => {
                    Some(RoundedRect::from_rect(rect, radius).to_path(0.01))
                }
                _ => Some(rect.to_path(0.01)),
            }
        }
        ShapeKind::Polygon => {
            let points = parse_points(node.attribute("points")?);
            if points.len() < 2 {
                return None;
            }
            let mut outline = BezPath::new();
            outline.move_to(points[0]);
            for point in &points[1..] {
                outline.line_to(*point);
            }
            outline.close_path();
            Some(outline)
        }
    }
}

fn parse_points(value: &str) -> Vec<Point> {
    let numbers: Vec<f64> = value
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Parse an SVG `transform` attribute into an [`Affine`]. Unknown or
/// malformed operations are skipped.
pub(crate) fn parse_transform(value: Option<&str>) -> Affine {
    let Some(value) = value else {
        return Affine::IDENTITY;
    };

    let mut combined = Affine::IDENTITY;
    for (name, args) in transform_ops(value) {
        let arg = |index: usize| args.get(index).copied();
        let op = match (name.as_str(), args.len()) {
            ("matrix", 6) => Affine::new([args[0], args[1], args[2], args[3], args[4], args[5]]),
            ("translate", 1..=2) => Affine::translate((args[0], arg(1).unwrap_or(0.))),
            ("scale", 1) => Affine::scale(args[0]),
            ("scale", 2) => Affine::scale_non_uniform(args[0], args[1]),
            ("rotate", 1) => Affine::rotate(args[0].to_radians()),
            ("rotate", 3) => {
                Affine::translate((args[1], args[2]))
                    * Affine::rotate(args[0].to_radians())
                    * Affine::translate((-args[1], -args[2]))
            }
            ("skewX", 1) => Affine::skew(args[0].to_radians().tan(), 0.),
            ("skewY", 1) => Affine::skew(0., args[0].to_radians().tan()),
            _ => {
                tracing::debug!(op = name.as_str(), "skipping unsupported transform");
                continue;
            }
        };
        combined = combined * op;
    }
    combined
}

fn transform_ops(value: &str) -> Vec<(String, Vec<f64>)> {
    let mut ops = Vec::new();
    for chunk in value.split(')') {
        let Some((name, args)) = chunk.split_once('(') else {
            continue;
        };
        let args = args
            .split([',', ' '])
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        ops.push((name.trim().trim_start_matches(',').to_string(), args));
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(svg: &str) -> VectorDocument {
        VectorDocument::parse(svg.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_shape_kinds_in_document_order() {
        let doc = parse(indoc! {r##"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
              <rect x="0" y="0" width="10" height="10"/>
              <circle cx="50" cy="50" r="10"/>
              <polygon points="0,0 10,0 5,10"/>
              <path d="M 20 20 L 30 20 L 30 30 Z"/>
              <text x="5" y="5">ignored</text>
              <ellipse cx="1" cy="1" rx="2" ry="3"/>
            </svg>
        "##});

        let kinds: Vec<_> = doc.shapes().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Rect,
                ShapeKind::Circle,
                ShapeKind::Polygon,
                ShapeKind::Path
            ]
        );
        assert_eq!(doc.size(), Size::new(100., 100.));
    }

    #[test]
    fn test_parse_viewport_fallbacks() {
        let doc = parse(r#"<svg xmlns="x" width="64px" height="48"></svg>"#);
        assert_eq!(doc.size(), Size::new(64., 48.));

        // No viewport at all: inferred from content extent.
        let doc = parse(r#"<svg xmlns="x"><rect width="30" height="20"/></svg>"#);
        assert_eq!(doc.size(), Size::new(30., 20.));
    }

    #[test]
    fn test_fill_parsing_and_inheritance() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 10 10">
              <rect width="1" height="1"/>
              <rect width="1" height="1" fill="#f00"/>
              <rect width="1" height="1" fill="none"/>
              <g fill="#0f0">
                <rect width="1" height="1"/>
                <rect width="1" height="1" style="fill: #00f" fill="#f00"/>
              </g>
            </svg>
        "##});

        let fills: Vec<_> = doc.shapes().iter().map(|s| s.fill()).collect();
        assert_eq!(fills[0], Some(hsla(0., 0., 0., 1.))); // default black
        assert_eq!(fills[1], parse_color("#f00"));
        assert_eq!(fills[2], None);
        assert_eq!(fills[3], parse_color("#0f0")); // inherited from <g>
        assert_eq!(fills[4], parse_color("#00f")); // style wins over attribute
    }

    #[test]
    fn test_stroke_parsing() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 10 10">
              <rect width="4" height="4" stroke="#000" stroke-width="2"/>
              <rect width="4" height="4"/>
            </svg>
        "##});

        let (color, width) = doc.shapes()[0].stroke().unwrap();
        assert_eq!(color, hsla(0., 0., 0., 1.));
        assert_eq!(width, 2.);
        assert!(doc.shapes()[1].stroke().is_none());
    }

    #[test]
    fn test_group_transform_applies_to_hit_test() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 100 100">
              <g transform="translate(40, 40)">
                <rect width="10" height="10"/>
              </g>
            </svg>
        "##});

        assert_eq!(doc.hit_test(Point::new(45., 45.)), Some(0));
        assert_eq!(doc.hit_test(Point::new(5., 5.)), None);
    }

    #[test]
    fn test_hit_test_topmost_wins() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 100 100">
              <rect width="50" height="50"/>
              <rect x="20" y="20" width="50" height="50"/>
            </svg>
        "##});

        // Overlap region belongs to the shape painted last.
        assert_eq!(doc.hit_test(Point::new(30., 30.)), Some(1));
        assert_eq!(doc.hit_test(Point::new(5., 5.)), Some(0));
        assert_eq!(doc.hit_test(Point::new(65., 65.)), Some(1));
        assert_eq!(doc.hit_test(Point::new(90., 90.)), None);
    }

    #[test]
    fn test_rasters_pass_clicks_through() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 100 100">
              <rect width="100" height="100"/>
              <image x="10" y="10" width="40" height="40" href="photo.png"/>
            </svg>
        "##});

        assert_eq!(doc.shapes().len(), 1);
        assert_eq!(doc.rasters().len(), 1);
        // A click inside the raster bounds lands on the shape beneath it.
        assert_eq!(doc.hit_test(Point::new(20., 20.)), Some(0));
    }

    #[test]
    fn test_set_fill_override_and_revert() {
        let mut doc = parse(r#"<svg xmlns="x"><rect width="5" height="5" fill="#f00"/></svg>"#);
        let base = doc.shapes()[0].fill();

        doc.set_fill(0, parse_color("#0f0"));
        assert_eq!(doc.shapes()[0].fill(), parse_color("#0f0"));

        doc.set_fill(0, None);
        assert_eq!(doc.shapes()[0].fill(), base);

        // Out-of-range indices are ignored.
        doc.set_fill(9, parse_color("#00f"));
    }

    #[test]
    fn test_fill_all() {
        let mut doc =
            parse(r#"<svg xmlns="x"><rect width="5" height="5"/><circle r="2"/></svg>"#);
        doc.fill_all(parse_color("#abc"));
        assert!(doc.shapes().iter().all(|s| s.fill() == parse_color("#abc")));
    }

    #[test]
    fn test_parse_transform_ops() {
        let affine = parse_transform(Some("translate(10, 5)"));
        assert_eq!(affine * Point::ZERO, Point::new(10., 5.));

        let affine = parse_transform(Some("translate(10) scale(2)"));
        assert_eq!(affine * Point::new(1., 1.), Point::new(12., 2.));

        let affine = parse_transform(Some("matrix(1 0 0 1 3 4)"));
        assert_eq!(affine * Point::ZERO, Point::new(3., 4.));

        assert_eq!(parse_transform(None), Affine::IDENTITY);
        assert_eq!(parse_transform(Some("garbage")), Affine::IDENTITY);
    }

    #[test]
    fn test_parse_failures() {
        assert!(VectorDocument::parse(b"not xml at all <<<").is_err());
        assert!(VectorDocument::parse(b"<html></html>").is_err());
        assert!(VectorDocument::parse(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_malformed_shapes_are_skipped() {
        let doc = parse(indoc! {r##"
            <svg xmlns="x" viewBox="0 0 10 10">
              <rect width="-5" height="5"/>
              <circle cx="1" cy="1"/>
              <path d="this is not path data"/>
              <polygon points="1"/>
              <rect width="5" height="5"/>
            </svg>
        "##});

        assert_eq!(doc.shapes().len(), 1);
        assert_eq!(doc.shapes()[0].kind, ShapeKind::Rect);
    }
}
