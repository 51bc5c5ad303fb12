use bytemuck::{Pod, Zeroable};

use crate::application::RenderFrame;
use crate::domain::chart::{CandleDirection, Color, Dimensions, Primitive};
use crate::domain::market_data::SmaField;

/// Attributes of a single candle for instanced drawing, in NDC
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CandleInstance {
    pub x: f32,
    pub width: f32,
    /// Top of the body (max(open, close))
    pub body_top: f32,
    /// Bottom of the body (min(open, close))
    pub body_bottom: f32,
    pub high: f32,
    pub low: f32,
    /// 1.0 for up candles, 0.0 for down
    pub bullish: f32,
    pub _padding: f32,
}

/// Volume bar rising from the bottom edge of the plot
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct VolumeInstance {
    pub x: f32,
    pub width: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Vertex of an average line strip
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Draw range of one polyline inside `PackedFrame::line_vertices`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineStrip {
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Frame converted to GPU-ready instance and vertex buffers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedFrame {
    pub candles: Vec<CandleInstance>,
    pub volumes: Vec<VolumeInstance>,
    pub line_vertices: Vec<LineVertex>,
    pub line_strips: Vec<LineStrip>,
}

impl PackedFrame {
    pub fn candle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.candles)
    }

    pub fn volume_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.volumes)
    }

    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.line_vertices)
    }
}

/// Pixel to normalized device coordinates, y pointing up
fn to_ndc(dimensions: &Dimensions, x_px: f64, y_px: f64) -> (f32, f32) {
    let x = (x_px / dimensions.width) * 2.0 - 1.0;
    let y = 1.0 - (y_px / dimensions.height) * 2.0;
    (x as f32, y as f32)
}

fn width_to_ndc(dimensions: &Dimensions, width_px: f64) -> f32 {
    (width_px / dimensions.width * 2.0) as f32
}

fn rgba(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, color.a]
}

/// Pack the primitives of one frame. An undrawable viewport packs to nothing.
pub fn pack_frame(frame: &RenderFrame) -> PackedFrame {
    let dimensions = frame.scales.dimensions;
    let mut packed = PackedFrame::default();
    if !dimensions.is_drawable() {
        return packed;
    }
    let colors = &frame.variant.style().colors;

    for primitive in &frame.primitives {
        match primitive {
            Primitive::Candle { x_px, open_px, close_px, high_px, low_px, width, direction, .. } => {
                let (x, open) = to_ndc(&dimensions, *x_px, *open_px);
                let (_, close) = to_ndc(&dimensions, *x_px, *close_px);
                let (_, high) = to_ndc(&dimensions, *x_px, *high_px);
                let (_, low) = to_ndc(&dimensions, *x_px, *low_px);
                packed.candles.push(CandleInstance {
                    x,
                    width: width_to_ndc(&dimensions, *width),
                    body_top: open.max(close),
                    body_bottom: open.min(close),
                    high,
                    low,
                    bullish: if *direction == CandleDirection::Up { 1.0 } else { 0.0 },
                    _padding: 0.0,
                });
            }
            Primitive::VolumeBar { x_px, height_px, width, .. } => {
                let (x, top) = to_ndc(&dimensions, *x_px, dimensions.height - height_px);
                packed.volumes.push(VolumeInstance {
                    x,
                    width: width_to_ndc(&dimensions, *width),
                    top,
                    bottom: -1.0,
                });
            }
            Primitive::AveragePolyline { period, points } => {
                let Some(field) = SmaField::for_period(*period) else {
                    continue;
                };
                let color = rgba(colors.average(field));
                packed.line_strips.push(LineStrip {
                    first_vertex: packed.line_vertices.len() as u32,
                    vertex_count: points.len() as u32,
                });
                packed.line_vertices.extend(points.iter().map(|[x_px, y_px]| {
                    let (x, y) = to_ndc(&dimensions, *x_px, *y_px);
                    LineVertex { position: [x, y], color }
                }));
            }
        }
    }

    packed
}
