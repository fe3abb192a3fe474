use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::{ChartConfig, ChartSnapshot};

pub const CHART_CONFIG_JSON_SCHEMA_V1: u32 = 1;
pub const CHART_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ChartSnapshot,
}

impl ChartConfig {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config json: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartConfigJsonContractV1 {
            schema_version: CHART_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize config contract v1: {e}"))
        })
    }

    /// Accepts either the versioned contract or a bare config payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config json: {e}")))?;

        let config = if value.get("schema_version").is_some() {
            let payload: ChartConfigJsonContractV1 =
                serde_json::from_value(value).map_err(|e| {
                    ChartError::InvalidData(format!("failed to parse config json payload: {e}"))
                })?;
            if payload.schema_version != CHART_CONFIG_JSON_SCHEMA_V1 {
                return Err(ChartError::InvalidData(format!(
                    "unsupported config schema version: {}",
                    payload.schema_version
                )));
            }
            payload.config
        } else {
            serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidData(format!("failed to parse config json payload: {e}"))
            })?
        };

        config.validate()?;
        Ok(config)
    }
}

impl ChartSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartSnapshotJsonContractV1 {
            schema_version: CHART_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ChartSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ChartSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != CHART_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
