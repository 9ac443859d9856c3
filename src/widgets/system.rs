//! System health strip along the bottom edge.
//!
//! Five readouts, each independent of the others: a field that is null or
//! absent renders `--` without affecting its neighbours.
//!
//! | Label | Field | Format |
//! |-------|-------|--------|
//! | CPU | `cpu_percent` | `23%` |
//! | GPU | `gpu_percent` | `41%` |
//! | TEMP | `temp_c` | `51.2°C` |
//! | MEM | `mem_used_percent` | `61%` |
//! | LOAD | `cpu_load_1m` / `cpu_cores` | `1.27/6` |

use embedded_graphics::prelude::*;
use heapless::String;

use crate::{
    format::{format_load, format_percent, format_temp},
    styles::{LABEL_STYLE_MUTED, LABEL_STYLE_WHITE, LEFT_ALIGNED},
    surface::Canvas,
    telemetry::SystemHealth,
};

const STRIP_X: i32 = 300;
const STRIP_Y: i32 = 530;
/// Horizontal distance between readouts.
const READOUT_PITCH: i32 = 104;
/// Offset of the value from its label (5 characters of the 6x10 font).
const VALUE_OFFSET: i32 = 30;

pub const READOUT_COUNT: usize = 5;

/// Label and formatted value for every readout, in display order.
pub fn system_readouts(system: Option<&SystemHealth>) -> [(&'static str, String<16>); READOUT_COUNT] {
    let field = |f: fn(&SystemHealth) -> Option<f32>| system.and_then(f);

    [
        ("CPU", widen(&format_percent(field(|s| s.cpu_percent)))),
        ("GPU", widen(&format_percent(field(|s| s.gpu_percent)))),
        ("TEMP", widen(&format_temp(field(|s| s.temp_c)))),
        ("MEM", widen(&format_percent(field(|s| s.mem_used_percent)))),
        ("LOAD", format_load(field(|s| s.cpu_load_1m), system.and_then(|s| s.cpu_cores))),
    ]
}

fn widen(value: &str) -> String<16> {
    let mut s = String::new();
    s.push_str(value).ok();
    s
}

pub fn draw_system_strip<C: Canvas>(canvas: &mut C, system: Option<&SystemHealth>) {
    for (i, (label, value)) in system_readouts(system).iter().enumerate() {
        let x = STRIP_X + i as i32 * READOUT_PITCH;
        canvas.text(label, Point::new(x, STRIP_Y), LABEL_STYLE_MUTED, LEFT_ALIGNED);
        canvas.text(value, Point::new(x + VALUE_OFFSET, STRIP_Y), LABEL_STYLE_WHITE, LEFT_ALIGNED);
    }
}
