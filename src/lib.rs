#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{MeshBuffers, SplitContext, SplitDiagnostics, SplitOptions};
use serde::Serialize;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second initialize() finds the logger already installed; keep it.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SplitExport {
    parts: Vec<MeshBuffers>,
    diagnostics: SplitDiagnostics,
}

#[derive(Debug, Serialize)]
struct NormalsExport {
    outward: MeshBuffers,
    inward: MeshBuffers,
}

/// Order-preserving `atan2` substitute, exported for benchmarks.
#[wasm_bindgen(js_name = notAtan2)]
#[must_use]
pub fn not_atan2(y: f64, x: f64) -> f64 {
    geom::not_atan2(y, x)
}

/// Splits flat triangle positions (9 floats per triangle) into disjoint parts.
#[wasm_bindgen(js_name = splitDisjointPositions)]
pub fn split_disjoint_positions(positions: &[f32]) -> Result<JsValue, JsValue> {
    let parts = geom::split_positions(positions).map_err(to_js_error)?;
    debug_log!("splitDisjointPositions: {} parts", parts.len());
    serde_wasm_bindgen::to_value(&parts).map_err(to_js_error)
}

/// Splits a serialized geometry into parts. `options` may be `undefined`.
#[wasm_bindgen(js_name = splitDisjointGeometry)]
pub fn split_disjoint_geometry(geometry: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let mesh: MeshBuffers = serde_wasm_bindgen::from_value(geometry).map_err(to_js_error)?;
    let options: SplitOptions = if options.is_undefined() || options.is_null() {
        SplitOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
    };

    let mut ctx = SplitContext::new(options);
    let (parts, diagnostics) =
        geom::split_disjoint_geometry_with_context(&mesh, &mut ctx).map_err(to_js_error)?;
    debug_log!("splitDisjointGeometry: {}", diagnostics.summary());

    serde_wasm_bindgen::to_value(&SplitExport { parts, diagnostics }).map_err(to_js_error)
}

/// Builds the outward and inward face-normal overlays of a serialized geometry.
#[wasm_bindgen(js_name = computeTriangleNormals)]
pub fn compute_triangle_normals(geometry: JsValue) -> Result<JsValue, JsValue> {
    let mesh: MeshBuffers = serde_wasm_bindgen::from_value(geometry).map_err(to_js_error)?;
    let (outward, inward) = geom::compute_triangle_normals(&mesh).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&NormalsExport { outward, inward }).map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
