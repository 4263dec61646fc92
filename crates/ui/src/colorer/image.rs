use std::rc::Rc;

use anyhow::Result;
use gpui::{
    App, Bounds, Context, Entity, EventEmitter, Hsla, InteractiveElement as _, IntoElement,
    MouseButton, MouseDownEvent, ParentElement as _, Path, PathBuilder, Pixels, Point, Render,
    SharedString, Styled, Window, canvas, div, point, px,
};
use kurbo::{Affine, BezPath, PathEl};
use serde::Deserialize;

use crate::color::serde_color;
use crate::colorer::document::{ShapeKind, VectorDocument};

/// Configuration for [`VectorImage`]. Field names deserialize from the
/// camelCase keys config-driven hosts use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    /// Path to the SVG image. Required; without it no image is produced.
    pub url: Option<SharedString>,
    /// Initial fill applied to every shape once the image loads.
    #[serde(deserialize_with = "serde_color::deserialize_opt")]
    pub default_fill: Option<Hsla>,
    /// Name prefix for the produced element ids.
    pub used_class: Option<SharedString>,
    /// Container element id, overriding the `used_class` default.
    pub id: Option<SharedString>,
}

impl ImageConfig {
    pub fn url(mut self, url: impl Into<SharedString>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn default_fill(mut self, fill: Hsla) -> Self {
        self.default_fill = Some(fill);
        self
    }

    pub fn used_class(mut self, used_class: impl Into<SharedString>) -> Self {
        self.used_class = Some(used_class.into());
        self
    }

    pub fn id(mut self, id: impl Into<SharedString>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Parse a configuration from loose JSON. Returns `None` when the value
    /// has an unrecognized shape.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// A click on one of the document's drawable shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeClickEvent {
    /// Index of the shape in document (paint) order.
    pub index: usize,
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEvent {
    /// The document finished loading and its shapes are interactive.
    Loaded { shapes: usize },
    ShapeClicked(ShapeClickEvent),
}

pub(crate) type OnShapeClick = dyn Fn(&ShapeClickEvent, &mut Window, &mut App);

/// A vector image loaded by reference, with click-to-fill interaction on its
/// drawable shapes.
///
/// Loading is asynchronous; until the load completes the element renders an
/// inert container. A load that never completes (broken reference) leaves it
/// inert indefinitely, without error.
pub struct VectorImage {
    source: Option<SharedString>,
    used_class: SharedString,
    id: Option<SharedString>,
    default_fill: Option<Hsla>,
    document: Option<VectorDocument>,
    bounds: Bounds<Pixels>,
    on_shape_click: Option<Rc<OnShapeClick>>,
}

impl EventEmitter<ImageEvent> for VectorImage {}

impl VectorImage {
    /// Build an image entity from a configuration. Returns `None` when the
    /// image reference is absent.
    ///
    /// Subscribe to [`ImageEvent`] to observe interaction; alternatively,
    /// construct via [`Self::new`] inside `cx.new` and chain
    /// [`Self::on_shape_click`] for a direct callback.
    pub fn build(config: ImageConfig, cx: &mut App) -> Option<Entity<Self>> {
        config.url.as_ref()?;
        Some(cx.new(|cx| Self::new(config, cx)))
    }

    /// Create the image and start loading its document. Prefer [`Self::build`]
    /// unless the configuration is already validated.
    pub fn new(config: ImageConfig, cx: &mut Context<Self>) -> Self {
        if let Some(url) = config.url.clone() {
            let path = url.to_string();
            cx.spawn(async move |this, cx| {
                let document = match smol::fs::read(&path).await {
                    Ok(data) => match VectorDocument::parse(&data) {
                        Ok(document) => document,
                        Err(error) => {
                            tracing::debug!(%error, path, "failed to parse vector image");
                            return;
                        }
                    },
                    Err(error) => {
                        tracing::debug!(%error, path, "failed to load vector image");
                        return;
                    }
                };
                this.update(cx, |this, cx| this.document_loaded(document, cx))
                    .ok();
            })
            .detach();
        }

        Self {
            source: config.url,
            used_class: config.used_class.unwrap_or_default(),
            id: config.id,
            default_fill: config.default_fill,
            document: None,
            bounds: Bounds::default(),
            on_shape_click: None,
        }
    }

    /// Add a handler invoked when a drawable shape is clicked, in addition to
    /// the emitted [`ImageEvent::ShapeClicked`].
    pub fn on_shape_click(
        mut self,
        handler: impl Fn(&ShapeClickEvent, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_shape_click = Some(Rc::new(handler));
        self
    }

    /// Install a document parsed from in-memory bytes, bypassing the
    /// asynchronous load. Useful for embedded assets.
    pub fn load_from_bytes(&mut self, data: &[u8], cx: &mut Context<Self>) -> Result<()> {
        let document = VectorDocument::parse(data)?;
        self.document_loaded(document, cx);
        Ok(())
    }

    fn document_loaded(&mut self, mut document: VectorDocument, cx: &mut Context<Self>) {
        if self.default_fill.is_some() {
            document.fill_all(self.default_fill);
        }
        let shapes = document.shapes().len();
        self.document = Some(document);
        cx.emit(ImageEvent::Loaded { shapes });
        cx.notify();
    }

    pub fn source(&self) -> Option<&SharedString> {
        self.source.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&VectorDocument> {
        self.document.as_ref()
    }

    /// Override the fill of one shape. `None` reverts to the document fill.
    pub fn set_fill(&mut self, index: usize, fill: Option<Hsla>, cx: &mut Context<Self>) {
        if let Some(document) = &mut self.document {
            document.set_fill(index, fill);
            cx.notify();
        }
    }

    /// Report a click on the shape at `index`, as if the user clicked it.
    pub fn click_shape(&mut self, index: usize, cx: &mut Context<Self>) {
        let Some(document) = &self.document else {
            return;
        };
        let Some(shape) = document.shapes().get(index) else {
            return;
        };
        cx.emit(ImageEvent::ShapeClicked(ShapeClickEvent {
            index,
            kind: shape.kind,
        }));
    }

    fn on_mouse_down(&mut self, event: &MouseDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let Some(document) = &self.document else {
            return;
        };
        let Some((transform, _)) = content_transform(document, self.bounds) else {
            return;
        };
        let local = event.position - self.bounds.origin;
        let doc_point = transform.inverse()
            * kurbo::Point::new(local.x.as_f32() as f64, local.y.as_f32() as f64);

        let Some(index) = document.hit_test(doc_point) else {
            return;
        };
        let kind = document.shapes()[index].kind;
        let clicked = ShapeClickEvent { index, kind };
        cx.emit(ImageEvent::ShapeClicked(clicked));
        if let Some(handler) = self.on_shape_click.clone() {
            handler(&clicked, window, cx);
        }
    }
}

impl Render for VectorImage {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let bounds_view = cx.entity().clone();
        let paint_view = cx.entity().clone();
        let container_id: SharedString = self
            .id
            .clone()
            .unwrap_or_else(|| format!("{}_container", self.used_class).into());

        div().id(container_id).size_full().child(
            div()
                .id(self.used_class.clone())
                .relative()
                .size_full()
                .on_mouse_down(
                    MouseButton::Left,
                    cx.listener(|this, event: &MouseDownEvent, window, cx| {
                        this.on_mouse_down(event, window, cx)
                    }),
                )
                .child(
                    canvas(
                        move |bounds, _, cx| {
                            bounds_view.update(cx, |this, _| this.bounds = bounds);
                        },
                        move |bounds, _, window, cx| {
                            let image = paint_view.read(cx);
                            if let Some(document) = &image.document {
                                paint_document(document, bounds, window);
                            }
                        },
                    )
                    .size_full(),
                ),
        )
    }
}

/// The affine mapping document coordinates into the element's local pixel
/// space (uniform scale-to-fit, centered), plus the scale factor.
fn content_transform(document: &VectorDocument, bounds: Bounds<Pixels>) -> Option<(Affine, f64)> {
    let doc_size = document.size();
    let width = bounds.size.width.as_f32() as f64;
    let height = bounds.size.height.as_f32() as f64;
    if doc_size.width <= 0. || doc_size.height <= 0. || width <= 0. || height <= 0. {
        return None;
    }

    let scale = (width / doc_size.width).min(height / doc_size.height);
    let offset_x = (width - doc_size.width * scale) / 2.;
    let offset_y = (height - doc_size.height * scale) / 2.;
    Some((
        Affine::translate((offset_x, offset_y)) * Affine::scale(scale),
        scale,
    ))
}

fn paint_document(document: &VectorDocument, bounds: Bounds<Pixels>, window: &mut Window) {
    let Some((transform, scale)) = content_transform(document, bounds) else {
        return;
    };

    for shape in document.shapes() {
        if let Some(fill) = shape.fill() {
            if fill.a > 0. {
                if let Some(path) =
                    build_path(shape.outline(), transform, bounds.origin, PathBuilder::fill())
                {
                    window.paint_path(path, fill);
                }
            }
        }
        if let Some((color, width)) = shape.stroke() {
            let stroke = PathBuilder::stroke(px((width * scale) as f32));
            if let Some(path) = build_path(shape.outline(), transform, bounds.origin, stroke) {
                window.paint_path(path, color);
            }
        }
    }
}

fn build_path(
    outline: &BezPath,
    transform: Affine,
    origin: Point<Pixels>,
    mut builder: PathBuilder,
) -> Option<Path<Pixels>> {
    let to_px = |p: kurbo::Point| point(origin.x + px(p.x as f32), origin.y + px(p.y as f32));
    let mut current = kurbo::Point::ZERO;

    for element in outline.iter() {
        match element {
            PathEl::MoveTo(p) => {
                let p = transform * p;
                builder.move_to(to_px(p));
                current = p;
            }
            PathEl::LineTo(p) => {
                let p = transform * p;
                builder.line_to(to_px(p));
                current = p;
            }
            PathEl::QuadTo(q, p) => {
                // Raise the quadratic to a cubic.
                let q = transform * q;
                let p = transform * p;
                let c1 = current.lerp(q, 2. / 3.);
                let c2 = p.lerp(q, 2. / 3.);
                builder.cubic_bezier_to(to_px(p), to_px(c1), to_px(c2));
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let c1 = transform * c1;
                let c2 = transform * c2;
                let p = transform * p;
                builder.cubic_bezier_to(to_px(p), to_px(c1), to_px(c2));
                current = p;
            }
            PathEl::ClosePath => {
                builder.close();
            }
        }
    }

    builder.build().ok()
}
