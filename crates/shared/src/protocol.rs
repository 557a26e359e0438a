use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    domain::{ProbabilityMap, SimulationResult},
    error::MalformedResponse,
};

pub const SIMULATE_PATH: &str = "/simulate";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody {
    probabilities: ProbabilityMap,
    simulations_run: u64,
    remaining_races: u64,
}

enum Discriminant {
    Success,
    Failure,
}

/// Interprets a decoded `/simulate` body.
///
/// `error: true` selects the failure shape; `error: false` or a missing flag
/// selects the success shape. Anything that fits neither is rejected.
pub fn classify(raw: Value) -> Result<SimulationResult, MalformedResponse> {
    let body = match raw {
        Value::Object(body) => body,
        other => return Err(MalformedResponse::NotAnObject(json_kind(&other).to_string())),
    };

    match discriminant(&body)? {
        Discriminant::Failure => classify_failure(&body),
        Discriminant::Success => classify_success(body),
    }
}

pub fn classify_bytes(bytes: &[u8]) -> Result<SimulationResult, MalformedResponse> {
    let raw: Value =
        serde_json::from_slice(bytes).map_err(|e| MalformedResponse::invalid_json(&e))?;
    classify(raw)
}

fn discriminant(body: &Map<String, Value>) -> Result<Discriminant, MalformedResponse> {
    match body.get("error") {
        Some(Value::Bool(true)) => Ok(Discriminant::Failure),
        Some(Value::Bool(false)) | None => Ok(Discriminant::Success),
        Some(other) => Err(MalformedResponse::InvalidDiscriminant(
            json_kind(other).to_string(),
        )),
    }
}

fn classify_failure(body: &Map<String, Value>) -> Result<SimulationResult, MalformedResponse> {
    match body.get("message") {
        Some(Value::String(message)) if !message.is_empty() => Ok(SimulationResult::Failure {
            message: message.clone(),
        }),
        _ => Err(MalformedResponse::MissingMessage),
    }
}

fn classify_success(body: Map<String, Value>) -> Result<SimulationResult, MalformedResponse> {
    let body: SuccessBody = serde_json::from_value(Value::Object(body))
        .map_err(|e| MalformedResponse::InvalidSuccessPayload(e.to_string()))?;
    Ok(SimulationResult::Success {
        probabilities: body.probabilities,
        simulations_run: body.simulations_run,
        remaining_races: body.remaining_races,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl SimulationResult {
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Success {
                probabilities,
                simulations_run,
                remaining_races,
            } => json!({
                "error": false,
                "probabilities": probabilities,
                "simulationsRun": simulations_run,
                "remainingRaces": remaining_races,
            }),
            Self::Failure { message } => json!({
                "error": true,
                "message": message,
            }),
        }
    }
}
