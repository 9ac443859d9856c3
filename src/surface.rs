//! Drawing surfaces and the renderer abstraction.
//!
//! The compositor and gauges never talk to a window directly. They draw
//! through [`Canvas`], a small set of primitives (rectangle, circle, arc,
//! line, text, image blit, gradient overlay). [`FrameBuffer`] is the real
//! implementation: an owned `Rgb888` pixel buffer that also implements
//! embedded-graphics' `DrawTarget`, so all primitives and mono fonts render
//! onto it unchanged. Presenting is a single `fill_contiguous` into whatever
//! display the host uses.
//!
//! # Blit
//!
//! [`Canvas::blit`] scales a source rectangle of a [`Bitmap`] into a
//! destination rectangle with nearest-neighbour sampling. Both rectangles are
//! clipped; a zero-sized result draws nothing.
//!
//! # Gradient
//!
//! [`Canvas::darken_gradient`] darkens every row by a factor interpolated
//! between the top and bottom alpha. Blending uses 8-bit fixed-point math per
//! channel.

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::{Rgb888, RgbColor},
    prelude::*,
    primitives::{Arc, Circle, Line, PrimitiveStyle, Rectangle},
    text::{Text, TextStyle},
};

use crate::error::HudError;

// =============================================================================
// Bitmap
// =============================================================================

/// A decoded camera frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Bitmap {
    /// Build a bitmap from packed 8-bit RGB triples.
    ///
    /// Returns `None` when `data` does not hold exactly `width * height` pixels.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?.checked_mul(3)?;
        if data.len() != expected {
            return None;
        }
        let pixels = data.chunks_exact(3).map(|px| Rgb888::new(px[0], px[1], px[2])).collect();
        Some(Self { width, height, pixels })
    }

    /// A bitmap filled with one color.
    pub fn solid(size: Size, color: Rgb888) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![color; size.width as usize * size.height as usize],
        }
    }

    /// Decode a JPEG or PNG image.
    pub fn decode(bytes: &[u8]) -> Result<Self, HudError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgb.pixels().map(|px| Rgb888::new(px[0], px[1], px[2])).collect(),
        })
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// A bitmap with no pixels cannot be drawn.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size())
    }
}

// =============================================================================
// Canvas
// =============================================================================

/// Draw primitives used by the compositor and the gauges.
pub trait Canvas {
    /// Pixel dimensions of the surface.
    fn surface_size(&self) -> Size;

    fn rect(&mut self, rect: Rectangle, style: PrimitiveStyle<Rgb888>);

    fn circle(&mut self, center: Point, diameter: u32, style: PrimitiveStyle<Rgb888>);

    fn arc(&mut self, center: Point, diameter: u32, start: Angle, sweep: Angle, style: PrimitiveStyle<Rgb888>);

    fn line(&mut self, from: Point, to: Point, style: PrimitiveStyle<Rgb888>);

    fn text(&mut self, text: &str, position: Point, style: MonoTextStyle<'static, Rgb888>, layout: TextStyle);

    /// Scale `src` (bitmap coordinates) into `dst` (surface coordinates).
    fn blit(&mut self, bitmap: &Bitmap, src: Rectangle, dst: Rectangle);

    /// Darken the whole surface, `top_alpha` at the first row to `bottom_alpha` at the last.
    fn darken_gradient(&mut self, top_alpha: f32, bottom_alpha: f32);
}

// =============================================================================
// FrameBuffer
// =============================================================================

/// Owned `Rgb888` surface.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl FrameBuffer {
    /// Create a black surface.
    pub fn new(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![Rgb888::BLACK; size.width as usize * size.height as usize],
        }
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).map(|idx| self.pixels[idx])
    }

    /// Present this buffer into another draw target at `origin`.
    pub fn copy_to<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.fill_contiguous(
            &Rectangle::new(origin, Size::new(self.width, self.height)),
            self.pixels.iter().copied(),
        )
    }

    #[inline]
    fn index(&self, point: Point) -> Option<usize> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(idx) = self.index(point) {
                self.pixels[idx] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

impl Canvas for FrameBuffer {
    fn surface_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn rect(&mut self, rect: Rectangle, style: PrimitiveStyle<Rgb888>) {
        rect.into_styled(style).draw(self).ok();
    }

    fn circle(&mut self, center: Point, diameter: u32, style: PrimitiveStyle<Rgb888>) {
        Circle::with_center(center, diameter).into_styled(style).draw(self).ok();
    }

    fn arc(&mut self, center: Point, diameter: u32, start: Angle, sweep: Angle, style: PrimitiveStyle<Rgb888>) {
        Arc::with_center(center, diameter, start, sweep).into_styled(style).draw(self).ok();
    }

    fn line(&mut self, from: Point, to: Point, style: PrimitiveStyle<Rgb888>) {
        Line::new(from, to).into_styled(style).draw(self).ok();
    }

    fn text(&mut self, text: &str, position: Point, style: MonoTextStyle<'static, Rgb888>, layout: TextStyle) {
        Text::with_text_style(text, position, style, layout).draw(self).ok();
    }

    fn blit(&mut self, bitmap: &Bitmap, src: Rectangle, dst: Rectangle) {
        let src = src.intersection(&bitmap.bounds());
        if src.is_zero_sized() || dst.is_zero_sized() {
            return;
        }

        let (src_w, src_h) = (u64::from(src.size.width), u64::from(src.size.height));
        let (dst_w, dst_h) = (u64::from(dst.size.width), u64::from(dst.size.height));
        let (src_x, src_y) = (src.top_left.x as u64, src.top_left.y as u64);

        for dy in 0..dst_h {
            let y = dst.top_left.y + dy as i32;
            if y < 0 || y as u32 >= self.height {
                continue;
            }
            let sy = src_y + dy * src_h / dst_h;
            let src_row = (sy * u64::from(bitmap.width)) as usize;
            let dst_row = y as usize * self.width as usize;

            for dx in 0..dst_w {
                let x = dst.top_left.x + dx as i32;
                if x < 0 || x as u32 >= self.width {
                    continue;
                }
                let sx = (src_x + dx * src_w / dst_w) as usize;
                self.pixels[dst_row + x as usize] = bitmap.pixels[src_row + sx];
            }
        }
    }

    fn darken_gradient(&mut self, top_alpha: f32, bottom_alpha: f32) {
        if self.width == 0 {
            return;
        }
        let last_row = self.height.saturating_sub(1).max(1) as f32;

        for (y, row) in self.pixels.chunks_exact_mut(self.width as usize).enumerate() {
            let t = y as f32 / last_row;
            let alpha = (bottom_alpha - top_alpha).mul_add(t, top_alpha).clamp(0.0, 1.0);
            // 8-bit fixed-point fraction of brightness kept
            let keep = ((1.0 - alpha) * 256.0) as u32;
            for px in row {
                *px = scale_rgb888(*px, keep);
            }
        }
    }
}

#[inline]
fn scale_rgb888(color: Rgb888, keep: u32) -> Rgb888 {
    let scale = |c: u8| ((u32::from(c) * keep) >> 8).min(255) as u8;
    Rgb888::new(scale(color.r()), scale(color.g()), scale(color.b()))
}

// =============================================================================
// Recording Canvas (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One recorded draw call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Rect(Rectangle),
        Circle { center: Point, diameter: u32 },
        Arc { center: Point, diameter: u32 },
        Line(Point, Point),
        Text(String),
        Blit { src: Rectangle, dst: Rectangle },
        Gradient { top: f32, bottom: f32 },
    }

    /// Canvas that records calls instead of drawing.
    pub struct RecordingCanvas {
        pub size: Size,
        pub ops: Vec<DrawOp>,
    }

    impl RecordingCanvas {
        pub fn new(size: Size) -> Self {
            Self { size, ops: Vec::new() }
        }

        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn blits(&self) -> Vec<(Rectangle, Rectangle)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Blit { src, dst } => Some((*src, *dst)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn surface_size(&self) -> Size {
            self.size
        }

        fn rect(&mut self, rect: Rectangle, _style: PrimitiveStyle<Rgb888>) {
            self.ops.push(DrawOp::Rect(rect));
        }

        fn circle(&mut self, center: Point, diameter: u32, _style: PrimitiveStyle<Rgb888>) {
            self.ops.push(DrawOp::Circle { center, diameter });
        }

        fn arc(&mut self, center: Point, diameter: u32, _start: Angle, _sweep: Angle, _style: PrimitiveStyle<Rgb888>) {
            self.ops.push(DrawOp::Arc { center, diameter });
        }

        fn line(&mut self, from: Point, to: Point, _style: PrimitiveStyle<Rgb888>) {
            self.ops.push(DrawOp::Line(from, to));
        }

        fn text(&mut self, text: &str, _position: Point, _style: MonoTextStyle<'static, Rgb888>, _layout: TextStyle) {
            self.ops.push(DrawOp::Text(text.to_owned()));
        }

        fn blit(&mut self, _bitmap: &Bitmap, src: Rectangle, dst: Rectangle) {
            self.ops.push(DrawOp::Blit { src, dst });
        }

        fn darken_gradient(&mut self, top_alpha: f32, bottom_alpha: f32) {
            self.ops.push(DrawOp::Gradient { top: top_alpha, bottom: bottom_alpha });
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
