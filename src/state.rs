//! Persisted plugin state: the formula text plus the control values.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dsp::engine::CrusherParams;
use crate::formula::{DEFAULT_FORMULA, FormulaStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrusherState {
    pub formula: String,
    #[serde(default)]
    pub params: CrusherParams,
}

impl Default for CrusherState {
    fn default() -> Self {
        CrusherState {
            formula: DEFAULT_FORMULA.to_string(),
            params: CrusherParams::default(),
        }
    }
}

impl CrusherState {
    /// Snapshot the current formula and controls.
    pub fn capture(store: &FormulaStore, params: &CrusherParams) -> Self {
        CrusherState {
            formula: store.text(),
            params: *params,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Publish the saved formula into `store` and return the saved controls.
    /// A formula that no longer compiles is replaced by the identity formula.
    pub fn restore(&self, store: &FormulaStore) -> CrusherParams {
        match store.set_formula(&self.formula) {
            Ok(generation) => info!(generation, "restored saved formula"),
            Err(err) => {
                warn!(formula = %self.formula, error = %err, "saved formula does not compile, using identity");
                store.reset();
            }
        }
        self.params.sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_roundtrip() {
        let store = FormulaStore::with_formula("t*(t>>5|t>>8)").unwrap();
        let params = CrusherParams {
            bit_depth: 8,
            bit_shift: 3,
            ..CrusherParams::default()
        };
        let json = CrusherState::capture(&store, &params).to_json().unwrap();
        let state = CrusherState::from_json(&json).unwrap();

        let fresh = FormulaStore::new();
        let restored = state.restore(&fresh);
        assert_eq!(fresh.text(), "t*(t>>5|t>>8)");
        assert_eq!(restored, params);
    }

    #[test]
    fn missing_params_use_defaults() {
        let state = CrusherState::from_json(r#"{"formula": "t&x"}"#).unwrap();
        assert_eq!(state.params, CrusherParams::default());
    }

    #[test]
    fn broken_formula_falls_back_to_identity() {
        let store = FormulaStore::with_formula("t").unwrap();
        let state = CrusherState {
            formula: "t*(".to_string(),
            ..CrusherState::default()
        };
        state.restore(&store);
        assert_eq!(store.text(), DEFAULT_FORMULA);
    }

    #[test]
    fn restored_params_are_sanitized() {
        let state = CrusherState::from_json(r#"{"formula": "x", "params": {"bitDepth": 99, "mix": -1.0}}"#).unwrap();
        let params = state.restore(&FormulaStore::new());
        assert_eq!(params.bit_depth, 16);
        assert_eq!(params.mix, 0.0);
    }
}
