//! Camera frame compositing.
//!
//! Each frame the render loop composites the latest camera bitmap onto the
//! main surface and again onto the inset:
//!
//! 1. No usable bitmap (none loaded yet, or zero width/height): fill with
//!    [`NO_SIGNAL_BG`] and center a "NO SIGNAL" label whose font scales with
//!    the destination height. No blit is attempted.
//! 2. Otherwise: aspect-preserving center crop of the source
//!    ([`center_crop`]), scaled to fill the whole destination. No letterboxing.
//! 3. Always: top-to-bottom darkening gradient. The inset variant is darker at
//!    the bottom.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::{
    colors::{NO_SIGNAL_BG, NO_SIGNAL_TEXT},
    config::{GRADIENT_INSET_BOTTOM_ALPHA, GRADIENT_MAIN_BOTTOM_ALPHA, GRADIENT_TOP_ALPHA, NO_SIGNAL_TEXT_RATIO},
    styles::{CENTERED_MIDDLE, SCALED_FONTS},
    surface::{Bitmap, Canvas},
};

const NO_SIGNAL_FILL: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(NO_SIGNAL_BG);

/// Which surface is being composited. Only the overlay strength differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceVariant {
    Main,
    Inset,
}

impl SurfaceVariant {
    /// Gradient alpha at the top and bottom edge.
    pub const fn gradient(self) -> (f32, f32) {
        match self {
            Self::Main => (GRADIENT_TOP_ALPHA, GRADIENT_MAIN_BOTTOM_ALPHA),
            Self::Inset => (GRADIENT_TOP_ALPHA, GRADIENT_INSET_BOTTOM_ALPHA),
        }
    }
}

/// Composite one surface from the current camera bitmap.
///
/// Safe to call before any bitmap has loaded.
pub fn composite<C: Canvas>(canvas: &mut C, bitmap: Option<&Bitmap>, variant: SurfaceVariant) {
    let dst = canvas.surface_size();
    if dst.width == 0 || dst.height == 0 {
        return;
    }
    let dst_rect = Rectangle::new(Point::zero(), dst);

    match bitmap.filter(|b| !b.is_empty()) {
        Some(bitmap) => {
            let src = center_crop(bitmap.size(), dst);
            canvas.blit(bitmap, src, dst_rect);
        }
        None => draw_no_signal(canvas, dst_rect),
    }

    let (top, bottom) = variant.gradient();
    canvas.darken_gradient(top, bottom);
}

/// Source rectangle that matches the destination aspect ratio, centered.
///
/// Wider source: crop width, keep full height. Taller (or equal) source:
/// crop height, keep full width. Both sizes must be non-zero.
pub fn center_crop(src: Size, dst: Size) -> Rectangle {
    let src_aspect = f64::from(src.width) / f64::from(src.height);
    let dst_aspect = f64::from(dst.width) / f64::from(dst.height);

    if src_aspect > dst_aspect {
        let width = ((f64::from(src.height) * dst_aspect).round() as u32).clamp(1, src.width);
        let x = (src.width - width) / 2;
        Rectangle::new(Point::new(x as i32, 0), Size::new(width, src.height))
    } else {
        let height = ((f64::from(src.width) / dst_aspect).round() as u32).clamp(1, src.height);
        let y = (src.height - height) / 2;
        Rectangle::new(Point::new(0, y as i32), Size::new(src.width, height))
    }
}

/// Largest scaled font whose glyph height fits the no-signal label budget.
pub fn no_signal_font(dst_height: u32) -> &'static MonoFont<'static> {
    let budget = (dst_height as f32 * NO_SIGNAL_TEXT_RATIO) as u32;
    SCALED_FONTS
        .iter()
        .rev()
        .find(|font| font.character_size.height <= budget)
        .copied()
        .unwrap_or(SCALED_FONTS[0])
}

fn draw_no_signal<C: Canvas>(canvas: &mut C, dst: Rectangle) {
    canvas.rect(dst, NO_SIGNAL_FILL);

    let font = no_signal_font(dst.size.height);
    let style = MonoTextStyle::new(font, NO_SIGNAL_TEXT);
    canvas.text("NO SIGNAL", dst.center(), style, CENTERED_MIDDLE);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawOp, RecordingCanvas};

    const HD: Size = Size::new(1280, 720);

    #[test]
    fn test_no_bitmap_draws_placeholder_without_blit() {
        let mut canvas = RecordingCanvas::new(HD);
        composite(&mut canvas, None, SurfaceVariant::Main);

        assert!(canvas.blits().is_empty(), "no draw-image call without a bitmap");
        assert_eq!(canvas.ops[0], DrawOp::Rect(Rectangle::new(Point::zero(), HD)));
        assert_eq!(canvas.texts(), vec!["NO SIGNAL"]);
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let mut first = RecordingCanvas::new(HD);
        let mut second = RecordingCanvas::new(HD);
        composite(&mut first, None, SurfaceVariant::Inset);
        composite(&mut second, None, SurfaceVariant::Inset);
        assert_eq!(first.ops, second.ops);
    }

    #[test]
    fn test_zero_sized_bitmap_takes_placeholder_path() {
        let empty = Bitmap::solid(Size::new(0, 480), NO_SIGNAL_BG);
        let mut canvas = RecordingCanvas::new(HD);
        composite(&mut canvas, Some(&empty), SurfaceVariant::Main);

        assert!(canvas.blits().is_empty());
        assert_eq!(canvas.texts(), vec!["NO SIGNAL"]);
    }

    #[test]
    fn test_bitmap_is_blitted_to_full_destination() {
        let frame = Bitmap::solid(Size::new(1280, 720), NO_SIGNAL_TEXT);
        let mut canvas = RecordingCanvas::new(HD);
        composite(&mut canvas, Some(&frame), SurfaceVariant::Main);

        let blits = canvas.blits();
        assert_eq!(blits.len(), 1);
        assert_eq!(blits[0].1, Rectangle::new(Point::zero(), HD), "output fills the whole destination");
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn test_gradient_always_applied_last() {
        let frame = Bitmap::solid(Size::new(64, 48), NO_SIGNAL_TEXT);
        for bitmap in [None, Some(&frame)] {
            let mut canvas = RecordingCanvas::new(HD);
            composite(&mut canvas, bitmap, SurfaceVariant::Main);
            assert!(
                matches!(canvas.ops.last(), Some(DrawOp::Gradient { .. })),
                "gradient must be the final draw call"
            );
        }
    }

    #[test]
    fn test_inset_gradient_darker_at_bottom() {
        let (main_top, main_bottom) = SurfaceVariant::Main.gradient();
        let (inset_top, inset_bottom) = SurfaceVariant::Inset.gradient();
        assert_eq!(main_top, inset_top);
        assert!(inset_bottom > main_bottom);
    }

    #[test]
    fn test_zero_sized_destination_is_noop() {
        let mut canvas = RecordingCanvas::new(Size::new(0, 0));
        composite(&mut canvas, None, SurfaceVariant::Main);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_center_crop_4_3_into_16_9_crops_height() {
        let crop = center_crop(Size::new(640, 480), Size::new(1280, 720));
        assert_eq!(crop.size, Size::new(640, 360), "full width kept, height cropped");
        assert_eq!(crop.top_left, Point::new(0, 60), "crop centered vertically");
    }

    #[test]
    fn test_center_crop_21_9_into_16_9_crops_width() {
        let crop = center_crop(Size::new(2520, 1080), Size::new(1920, 1080));
        assert_eq!(crop.size, Size::new(1920, 1080), "full height kept, width cropped");
        assert_eq!(crop.top_left, Point::new(300, 0), "crop centered horizontally");
    }

    #[test]
    fn test_center_crop_same_aspect_is_identity() {
        let crop = center_crop(Size::new(1280, 720), Size::new(960, 540));
        assert_eq!(crop, Rectangle::new(Point::zero(), Size::new(1280, 720)));
    }

    #[test]
    fn test_center_crop_never_exceeds_source() {
        for (sw, sh) in [(1, 1000), (1000, 1), (3, 7), (1920, 1080)] {
            let crop = center_crop(Size::new(sw, sh), Size::new(256, 144));
            assert!(crop.size.width >= 1 && crop.size.width <= sw);
            assert!(crop.size.height >= 1 && crop.size.height <= sh);
        }
    }

    #[test]
    fn test_no_signal_font_scales_with_height() {
        let small = no_signal_font(144);
        let large = no_signal_font(1080);
        assert!(large.character_size.height > small.character_size.height);
        assert!(no_signal_font(0).character_size.height > 0, "falls back to the smallest font");
    }
}
