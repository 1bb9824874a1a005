//! WASM bindings for frontend prize previews

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;
use crate::{classify, commission_for, prize_curve, prize_shares, validate_distribution, PrizeModel};

/// Parse a prize model.
///
/// Accepts:
/// - `"Weighted"`
/// - `{"Percentages": [45, 30, 15, 7, 3]}`
/// - a bare array `[45, 30, 15, 7, 3]`, read as percentages
fn parse_prize_model(json: &str) -> Result<PrizeModel, String> {
    if let Ok(model) = serde_json::from_str::<PrizeModel>(json) {
        return Ok(model);
    }
    let table: Vec<u8> = serde_json::from_str(json)
        .map_err(|e| format!("Invalid prize model: {}", e))?;
    Ok(PrizeModel::Percentages(table))
}

/// Normalized weighted curve for `player_count` ranked players, first place first
#[wasm_bindgen]
pub fn get_prize_curve(player_count: u32) -> Result<JsValue, JsError> {
    let curve = prize_curve(player_count as usize).map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&curve)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct PayoutPreview {
    collected: u64,
    commission: u64,
    pool: u64,
    shares: Vec<u64>,
    residual: u64,
}

/// Preview what each rank would receive
///
/// # Arguments
/// * `model_json` - prize model, see `parse_prize_model`
/// * `entry_fee` - fee per player in base units
/// * `player_count` - number of paid entrants, all of them ranked
/// * `commission_bps` - protocol commission in basis points
#[wasm_bindgen]
pub fn preview_prize_shares(
    model_json: &str,
    entry_fee: u64,
    player_count: u32,
    commission_bps: u16,
) -> Result<JsValue, JsError> {
    let model = parse_prize_model(model_json).map_err(|e| JsError::new(&e))?;

    let collected = entry_fee
        .checked_mul(player_count as u64)
        .ok_or_else(|| JsError::new("Entry fee total overflows"))?;
    let commission = commission_for(collected, commission_bps).map_err(|e| JsError::new(&e.to_string()))?;
    let pool = collected - commission;
    let shares = prize_shares(pool, &model, player_count as usize)
        .map_err(|e| JsError::new(&e.to_string()))?;
    let residual = pool - shares.iter().sum::<u64>();

    let preview = PayoutPreview { collected, commission, pool, shares, residual };
    serde_wasm_bindgen::to_value(&preview)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate a percentage table
///
/// Returns `{valid: true}` or `{valid: false, error: "..."}`, never throws.
#[wasm_bindgen]
pub fn validate_prize_distribution(table: &[u8]) -> JsValue {
    let result = match validate_distribution(table) {
        Ok(()) => ValidationResult { valid: true, error: None },
        Err(e) => ValidationResult { valid: false, error: Some(e.to_string()) },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Lifecycle phase name at `now` ("Open", "Started", "Ended" or "Canceled")
#[wasm_bindgen]
pub fn classify_phase(now: u64, start: u64, end: u64, canceled: bool) -> String {
    format!("{:?}", classify(now, start, end, canceled))
}
