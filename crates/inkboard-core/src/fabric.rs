//! Import of fabric.js canvas JSON (`canvas.toJSON()` output).

use crate::canvas::{CanvasDocument, DocumentError};
use crate::shapes::{
    Ellipse, Freehand, Image, Line, Rectangle, SerializableColor, Shape, ShapeStyle, Text,
    Triangle,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Affine, Point, Rect};
use serde_json::Value;

/// Build a document from a fabric.js canvas JSON value.
///
/// Unsupported objects are skipped with a warning.
pub fn import_fabric(value: &Value) -> Result<CanvasDocument, DocumentError> {
    if value.is_null() {
        return Err(DocumentError::Empty);
    }
    let objects = value
        .get("objects")
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentError::UnsupportedFabric("missing 'objects' array".to_string()))?;

    let mut doc = CanvasDocument::new();
    for obj in objects {
        let obj_type = obj.get("type").and_then(Value::as_str).unwrap_or("");
        match convert_object(obj_type, obj) {
            Some(shape) => doc.add_shape(shape),
            None => log::warn!("Skipping fabric object of type '{}'", obj_type),
        }
    }

    if let Some(bg) = value.get("backgroundImage").filter(|v| v.is_object()) {
        match convert_image(bg) {
            Some(image) => doc.background_image = Some(image),
            None => log::warn!("Skipping fabric background image"),
        }
    }

    Ok(doc)
}

/// Common placement and style attributes of a fabric object.
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    /// Clockwise rotation in degrees about `left`/`top`.
    angle: f64,
    flip_x: bool,
    flip_y: bool,
    style: ShapeStyle,
}

impl Frame {
    fn read(obj: &Value) -> Self {
        let stroke = obj.get("stroke").and_then(Value::as_str).and_then(parse_color);
        let fill = obj.get("fill").and_then(Value::as_str).and_then(parse_color);
        let stroke_width = number(obj, "strokeWidth").unwrap_or(1.0);
        Self {
            left: number(obj, "left").unwrap_or(0.0),
            top: number(obj, "top").unwrap_or(0.0),
            width: number(obj, "width").unwrap_or(0.0),
            height: number(obj, "height").unwrap_or(0.0),
            scale_x: number(obj, "scaleX").unwrap_or(1.0),
            scale_y: number(obj, "scaleY").unwrap_or(1.0),
            angle: number(obj, "angle").unwrap_or(0.0),
            flip_x: obj.get("flipX").and_then(Value::as_bool).unwrap_or(false),
            flip_y: obj.get("flipY").and_then(Value::as_bool).unwrap_or(false),
            style: ShapeStyle {
                // An object without a stroke is drawn by its fill alone
                stroke_color: stroke.unwrap_or_else(SerializableColor::transparent),
                stroke_width: if stroke.is_some() { stroke_width } else { 0.0 },
                fill_color: fill.filter(|c| c.a > 0),
                opacity: number(obj, "opacity").unwrap_or(1.0),
            },
        }
    }

    fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale_x, self.height * self.scale_y)
    }

    fn is_transformed(&self) -> bool {
        self.angle.rem_euclid(360.0) != 0.0 || self.flip_x || self.flip_y
    }

    /// Flips mirror inside `area`; the rotation then turns everything about `left`/`top`.
    fn orientation(&self, area: Rect) -> Affine {
        let center = area.center().to_vec2();
        let sx = if self.flip_x { -1.0 } else { 1.0 };
        let sy = if self.flip_y { -1.0 } else { 1.0 };
        let flip = Affine::translate(center)
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center);
        Affine::rotate_about(self.angle.to_radians(), self.origin()) * flip
    }

    /// Map points from object space into the frame. Their unrotated bounding box
    /// sits at `left`/`top`.
    fn place_points(&self, points: &[Point]) -> Vec<Point> {
        let Some(first) = points.first() else {
            return Vec::new();
        };
        let bounds = points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p));
        let placed = Affine::translate(self.origin().to_vec2())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(-bounds.origin().to_vec2());
        let area = placed.transform_rect_bbox(bounds);
        let transform = self.orientation(area) * placed;
        points.iter().map(|p| transform * *p).collect()
    }
}

fn number(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn convert_object(obj_type: &str, obj: &Value) -> Option<Shape> {
    let frame = Frame::read(obj);
    let (width, height) = frame.scaled_size();
    let point_based = matches!(obj_type, "line" | "polyline" | "polygon" | "path");
    if frame.is_transformed() && !point_based {
        log::warn!(
            "Importing fabric {} without its rotation ({} deg) or flip",
            obj_type,
            frame.angle
        );
    }
    let shape = match obj_type {
        "rect" => {
            let mut rect = Rectangle::new(frame.origin(), width, height);
            rect.style = frame.style;
            Shape::Rectangle(rect)
        }
        "circle" | "ellipse" => {
            let (rx, ry) = if obj_type == "circle" {
                let radius = number(obj, "radius")?;
                (radius, radius)
            } else {
                (number(obj, "rx")?, number(obj, "ry")?)
            };
            let (rx, ry) = (rx * frame.scale_x, ry * frame.scale_y);
            let center = Point::new(frame.left + rx, frame.top + ry);
            let mut ellipse = Ellipse::new(center, rx, ry);
            ellipse.style = frame.style;
            Shape::Ellipse(ellipse)
        }
        "triangle" => {
            let mut triangle = Triangle::new(frame.origin(), width, height);
            triangle.style = frame.style;
            Shape::Triangle(triangle)
        }
        "line" => {
            let x1 = number(obj, "x1").unwrap_or(0.0);
            let y1 = number(obj, "y1").unwrap_or(0.0);
            let x2 = number(obj, "x2").unwrap_or(0.0);
            let y2 = number(obj, "y2").unwrap_or(0.0);
            // Endpoints are relative to the object's center; only their direction matters here
            let (sx, ex) = if x1 <= x2 {
                (frame.left, frame.left + width)
            } else {
                (frame.left + width, frame.left)
            };
            let (sy, ey) = if y1 <= y2 {
                (frame.top, frame.top + height)
            } else {
                (frame.top + height, frame.top)
            };
            let area = Rect::from_origin_size(frame.origin(), (width, height));
            let orientation = frame.orientation(area);
            let mut line = Line::new(orientation * Point::new(sx, sy), orientation * Point::new(ex, ey));
            line.style = frame.style;
            Shape::Line(line)
        }
        "polyline" | "polygon" => {
            let raw: Vec<Point> = obj
                .get("points")?
                .as_array()?
                .iter()
                .filter_map(|p| Some(Point::new(number(p, "x")?, number(p, "y")?)))
                .collect();
            let mut points = frame.place_points(&raw);
            if obj_type == "polygon" {
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
            }
            freehand(points, frame.style)?
        }
        "path" => {
            let raw = path_vertices(obj.get("path")?.as_array()?);
            freehand(frame.place_points(&raw), frame.style)?
        }
        "text" | "textbox" | "i-text" => {
            let content = obj.get("text").and_then(Value::as_str)?.to_string();
            let mut text = Text::new(frame.origin(), content);
            text.font_size = number(obj, "fontSize").unwrap_or(Text::DEFAULT_FONT_SIZE) * frame.scale_y;
            text.style = frame.style;
            if let Some(fill) = text.style.fill_color {
                text.style.stroke_color = fill;
            }
            Shape::Text(text)
        }
        "image" => Shape::Image(convert_image(obj)?),
        _ => return None,
    };
    Some(shape)
}

fn freehand(points: Vec<Point>, mut style: ShapeStyle) -> Option<Shape> {
    if points.is_empty() {
        return None;
    }
    // Open paths are never filled
    style.fill_color = None;
    let mut path = Freehand::from_points(points);
    path.style = style;
    Some(Shape::Freehand(path))
}

/// End points of every `M`/`L`/`Q`/`C` command in a fabric path.
fn path_vertices(commands: &[Value]) -> Vec<Point> {
    commands
        .iter()
        .filter_map(|cmd| {
            let parts = cmd.as_array()?;
            let op = parts.first()?.as_str()?;
            if !matches!(op, "M" | "L" | "Q" | "C") {
                return None;
            }
            let coords: Vec<f64> = parts[1..].iter().filter_map(Value::as_f64).collect();
            match coords.as_slice() {
                [.., x, y] => Some(Point::new(*x, *y)),
                _ => None,
            }
        })
        .collect()
}

fn convert_image(obj: &Value) -> Option<Image> {
    let src = obj.get("src").and_then(Value::as_str)?;
    let Some(bytes) = decode_data_url(src) else {
        log::warn!("Only data: URL image sources can be imported");
        return None;
    };
    let frame = Frame::read(obj);
    let mut image = match Image::from_bytes(frame.origin(), &bytes) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Skipping image: {}", e);
            return None;
        }
    };
    let (width, height) = frame.scaled_size();
    if width > 0.0 && height > 0.0 {
        image = image.with_size(width, height);
    }
    image.style.opacity = frame.style.opacity;
    Some(image)
}

fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let rest = src.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Parse a CSS color as written by fabric.js.
///
/// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and the
/// names `black`, `white` and `transparent`.
pub fn parse_color(color: &str) -> Option<SerializableColor> {
    let color = color.trim();
    match color.to_ascii_lowercase().as_str() {
        "" => return None,
        "transparent" => return Some(SerializableColor::transparent()),
        "black" => return Some(SerializableColor::black()),
        "white" => return Some(SerializableColor::white()),
        _ => {}
    }
    if color.starts_with('#') {
        return SerializableColor::from_hex(color);
    }

    let (args, has_alpha) = if let Some(args) = color.strip_prefix("rgba(") {
        (args, true)
    } else {
        (color.strip_prefix("rgb(")?, false)
    };
    let parts: Vec<&str> = args.strip_suffix(')')?.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match (parts.as_slice(), has_alpha) {
        (&[r, g, b], false) => Some(SerializableColor::new(channel(r)?, channel(g)?, channel(b)?, 255)),
        (&[r, g, b, a], true) => {
            let alpha = a.parse::<f64>().ok()?.clamp(0.0, 1.0);
            Some(SerializableColor::new(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}
