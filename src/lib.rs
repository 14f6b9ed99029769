pub mod compiler;
pub mod dsp;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod lexer;
pub mod program;
pub mod state;
pub mod token;

pub use crate::compiler::compile;
pub use crate::error::SyntaxError;
pub use crate::evaluator::evaluate;

use crate::dsp::engine::CrusherParams;
use crate::formula::FormulaStore;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the ribcrusher-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: compile a formula into its postfix instruction list.
/// Errors come back as a rendered diagnostic string.
#[wasm_bindgen]
pub fn compile_formula(source: &str) -> Result<JsValue, JsValue> {
    let program = compile(source).map_err(|e| JsValue::from_str(&e.report(source)))?;
    serde_wasm_bindgen::to_value(program.instructions())
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// `undefined` or `null` selects the default `CrusherParams`.
fn params_from_js(params: JsValue) -> Result<CrusherParams, JsValue> {
    if params.is_undefined() || params.is_null() {
        return Ok(CrusherParams::default());
    }
    serde_wasm_bindgen::from_value(params).map_err(|e| JsValue::from_str(&format!("{e}")))
}

fn formula_from_source(formula: &str) -> Result<FormulaStore, JsValue> {
    FormulaStore::with_formula(formula).map_err(|e| JsValue::from_str(&e.report(formula)))
}

/// WASM-exposed: run mono `input` through the crusher with `formula`.
/// `params` is a `CrusherParams` object; `undefined` or `null` selects the defaults.
#[wasm_bindgen]
pub fn render_crushed_samples(
    formula: &str,
    input: Vec<f32>,
    sample_rate: u32,
    params: JsValue,
) -> Result<Vec<f32>, JsValue> {
    let store = formula_from_source(formula)?;
    let params = params_from_js(params)?;
    Ok(dsp::renderer::render_samples(
        &input,
        sample_rate,
        &params,
        &store.current(),
    ))
}

/// WASM-exposed: crush mono `input` and return it as a 16-bit WAV byte array.
#[wasm_bindgen]
pub fn render_crushed_wav(
    formula: &str,
    input: Vec<f32>,
    sample_rate: u32,
    params: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let store = formula_from_source(formula)?;
    let params = params_from_js(params)?;
    Ok(dsp::renderer::render_wav(
        &input,
        sample_rate,
        &params,
        &store.current(),
    ))
}
