//! Canvas document and state management.

use crate::shapes::{Image, Shape, ShapeId, point_to_polyline_dist};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Version stamped into every serialized document.
pub const DOCUMENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Document load/save errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document is empty")]
    Empty,
    #[error("Invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Malformed document: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Unsupported import: {0}")]
    UnsupportedFabric(String),
}

/// An eraser stroke attached to the object it was drawn over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraserStroke {
    /// Points of the stroke, in canvas coordinates.
    pub points: Vec<Point>,
    /// Brush width.
    pub width: f64,
}

impl EraserStroke {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self { points, width }
    }

    /// Bounding box of the stroke including the brush radius.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let half = self.width / 2.0;
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
            .inflate(half, half)
    }

    /// Whether the brush covers a point.
    pub fn covers(&self, point: Point) -> bool {
        point_to_polyline_dist(point, &self.points) <= self.width / 2.0
    }

    /// Whether the stroke passes over a shape.
    pub fn touches(&self, shape: &Shape) -> bool {
        if self.bounds().intersect(shape.bounds().inflate(1.0, 1.0)).area() <= 0.0 {
            return false;
        }
        let tolerance = self.width / 2.0;
        let step = tolerance.max(1.0);
        match self.points.as_slice() {
            [single] => shape.hit_test(*single, tolerance),
            points => points.windows(2).any(|w| {
                let (a, b) = (w[0], w[1]);
                let samples = (a.distance(b) / step).ceil().max(1.0) as usize;
                (0..=samples).any(|i| shape.hit_test(a.lerp(b, i as f64 / samples as f64), tolerance))
            }),
        }
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

fn current_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// A canvas document: every placed object plus an optional background image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    /// Version of the writer that produced the document.
    #[serde(default = "current_version")]
    pub version: String,
    /// Objects back to front.
    pub objects: Vec<Shape>,
    /// Background image, drawn below every object and never erased or cleared.
    #[serde(default)]
    pub background_image: Option<Image>,
    /// Eraser strokes applied to each object.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub erasures: HashMap<ShapeId, Vec<EraserStroke>>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            version: current_version(),
            objects: Vec::new(),
            background_image: None,
            erasures: HashMap::new(),
        }
    }

    /// Add a shape on top of every other object.
    pub fn add_shape(&mut self, shape: Shape) {
        self.objects.push(shape);
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        self.erasures.remove(&id);
        Some(self.objects.remove(index))
    }

    /// Remove every object and erasure. The background image stays.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.erasures.clear();
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.objects.iter().position(|s| s.id() == id)
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.iter_mut().find(|s| s.id() == id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.objects.iter()
    }

    /// Eraser strokes applied to a shape.
    pub fn erasures_for(&self, id: ShapeId) -> &[EraserStroke] {
        self.erasures.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply an eraser stroke to every object it passes over.
    /// Returns the IDs of the affected objects.
    pub fn erase(&mut self, stroke: &EraserStroke) -> Vec<ShapeId> {
        if stroke.points.is_empty() {
            return Vec::new();
        }
        let hit: Vec<ShapeId> = self
            .objects
            .iter()
            .filter(|s| stroke.touches(s))
            .map(Shape::id)
            .collect();
        for id in &hit {
            self.erasures.entry(*id).or_default().push(stroke.clone());
        }
        hit
    }

    /// Move a shape, carrying its erasures along.
    pub fn translate_shape(&mut self, id: ShapeId, delta: Vec2) {
        let affine = Affine::translate(delta);
        if let Some(shape) = self.get_shape_mut(id) {
            shape.transform(affine);
        }
        if let Some(strokes) = self.erasures.get_mut(&id) {
            for stroke in strokes {
                stroke.transform(affine);
            }
        }
    }

    /// Find shapes at a point, front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.objects
            .iter()
            .rev()
            .filter(|s| s.hit_test(point, tolerance))
            .map(Shape::id)
            .collect()
    }

    /// Find shapes that intersect a rectangle, back to front.
    pub fn shapes_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.objects
            .iter()
            .filter(|s| s.intersects_rect(rect))
            .map(Shape::id)
            .collect()
    }

    /// Check if the document has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get the number of objects (the background image is not counted).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `type` tags of every object, back to front.
    pub fn type_tags(&self) -> Vec<&'static str> {
        self.objects.iter().map(Shape::type_tag).collect()
    }

    /// Serialize the document to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, DocumentError> {
        serde_json::to_value(self).map_err(DocumentError::Serialize)
    }

    /// Deserialize a document from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        if value.is_null() {
            return Err(DocumentError::Empty);
        }
        serde_json::from_value(value).map_err(DocumentError::Malformed)
    }

    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    /// Deserialize a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(DocumentError::Parse)?;
        Self::from_value(value)
    }
}

/// The canvas host: the document plus transient selection state.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Currently selected shape IDs.
    pub selection: Vec<ShapeId>,
    /// Objects that cannot be selected.
    locked: HashSet<ShapeId>,
    /// Whether more than one object can be selected at once.
    multi_select: bool,
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the document.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.document.add_shape(shape);
        id
    }

    /// Remove a shape from the canvas.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.selection.retain(|&s| s != id);
        self.locked.remove(&id);
        self.document.remove_shape(id)
    }

    /// Remove every object except the background image.
    pub fn clear(&mut self) {
        self.document.clear();
        self.selection.clear();
        self.locked.clear();
    }

    /// Mark every existing object non-selectable and drop the selection.
    pub fn lock_all(&mut self) {
        self.locked = self.document.objects.iter().map(Shape::id).collect();
        self.selection.clear();
        self.multi_select = false;
    }

    /// Mark every object selectable and allow multi-object selection.
    pub fn unlock_all(&mut self) {
        self.locked.clear();
        self.multi_select = true;
    }

    /// Whether an object can be selected.
    pub fn is_selectable(&self, id: ShapeId) -> bool {
        !self.locked.contains(&id) && self.document.get_shape(id).is_some()
    }

    /// Whether multi-object selection is enabled.
    pub fn multi_select(&self) -> bool {
        self.multi_select
    }

    /// Topmost selectable shape at a point.
    pub fn selectable_at_point(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.document
            .shapes_at_point(point, tolerance)
            .into_iter()
            .find(|id| !self.locked.contains(id))
    }

    /// Selectable shapes intersecting a rectangle.
    pub fn selectable_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.document
            .shapes_in_rect(rect)
            .into_iter()
            .filter(|id| !self.locked.contains(id))
            .collect()
    }

    /// Select a single shape, replacing the current selection.
    pub fn select(&mut self, id: ShapeId) {
        if !self.is_selectable(id) {
            return;
        }
        self.selection.clear();
        self.selection.push(id);
    }

    /// Add a shape to the selection. Without multi-select this replaces it.
    pub fn add_to_selection(&mut self, id: ShapeId) {
        if !self.multi_select {
            self.select(id);
            return;
        }
        if self.is_selectable(id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    /// Toggle a shape's membership in the selection.
    pub fn toggle_selection(&mut self, id: ShapeId) {
        if self.is_selected(id) {
            self.selection.retain(|&s| s != id);
        } else {
            self.add_to_selection(id);
        }
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Check if a shape is selected.
    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(&id)
    }

    /// Move every selected shape.
    pub fn move_selected(&mut self, delta: Vec2) {
        for id in self.selection.clone() {
            self.document.translate_shape(id, delta);
        }
    }

    /// Delete selected shapes.
    pub fn delete_selected(&mut self) -> usize {
        let ids: Vec<ShapeId> = self.selection.drain(..).collect();
        ids.into_iter()
            .filter(|id| self.remove_shape(*id).is_some())
            .count()
    }

    /// Serialize the document to a JSON value.
    pub fn serialize(&self) -> Result<serde_json::Value, DocumentError> {
        self.document.to_value()
    }

    /// Replace the document with one described by a JSON value.
    ///
    /// On error the canvas is left untouched.
    pub fn deserialize(&mut self, value: serde_json::Value) -> Result<(), DocumentError> {
        let document = CanvasDocument::from_value(value)?;
        self.load_document(document);
        Ok(())
    }

    /// Replace the document with one parsed from JSON text.
    pub fn deserialize_str(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = CanvasDocument::from_json(json)?;
        self.load_document(document);
        Ok(())
    }

    /// Replace the document and reset transient state.
    pub fn load_document(&mut self, document: CanvasDocument) {
        self.document = document;
        self.selection.clear();
        self.locked.clear();
    }
}
