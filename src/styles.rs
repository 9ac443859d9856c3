//! Pre-computed static text styles.
//!
//! `MonoTextStyle` and `TextStyle` are `const`-constructible in
//! embedded-graphics 0.8, so every style the gauges use is built at compile
//! time instead of once per frame. Styles with a runtime color (delta sign,
//! camera indicator) use the exposed font references with
//! `MonoTextStyle::new(FONT, color)`.
//!
//! Small fonts come from the ISO 8859-1 set so the temperature readout can
//! print a degree sign.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        iso_8859_1::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb888,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::{
    PROFONT_7_POINT, PROFONT_9_POINT, PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT,
    PROFONT_24_POINT,
};

use crate::colors::{MUTED, WHITE};

// =============================================================================
// Text Alignment Styles
// =============================================================================

pub const CENTERED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Center).build();

/// Centered on both axes. Used where the anchor is the middle of a box.
pub const CENTERED_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

pub const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).build();

pub const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Right).build();

// =============================================================================
// Font References (for dynamic color styles)
// =============================================================================

/// Small label font (6x10).
pub const LABEL_FONT: &MonoFont = &FONT_6X10;

/// Medium text font (10x20). Lap times and delta.
pub const TEXT_FONT: &MonoFont = &FONT_10X20;

/// `ProFont` sizes in ascending glyph height, for text that scales with its surface.
pub const SCALED_FONTS: [&MonoFont; 7] = [
    &PROFONT_7_POINT,
    &PROFONT_9_POINT,
    &PROFONT_10_POINT,
    &PROFONT_12_POINT,
    &PROFONT_14_POINT,
    &PROFONT_18_POINT,
    &PROFONT_24_POINT,
];

// =============================================================================
// Pre-computed Text Styles
// =============================================================================

/// Small white text for labels.
pub const LABEL_STYLE_WHITE: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&FONT_6X10, WHITE);

/// Small muted text for units and secondary labels.
pub const LABEL_STYLE_MUTED: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&FONT_6X10, MUTED);

/// Medium white text for lap times.
pub const TEXT_STYLE_WHITE: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&FONT_10X20, WHITE);

/// Medium muted text for placeholders.
pub const TEXT_STYLE_MUTED: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&FONT_10X20, MUTED);

/// Large white text for speed and gear.
pub const VALUE_STYLE_WHITE: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&PROFONT_24_POINT, WHITE);

/// Medium `ProFont` (18pt) for the RPM readout.
pub const VALUE_STYLE_MEDIUM: MonoTextStyle<'static, Rgb888> = MonoTextStyle::new(&PROFONT_18_POINT, WHITE);
