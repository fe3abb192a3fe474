mod config;
mod json_contract;
mod price_chart;
mod snapshot;

pub use config::{ChartConfig, MAX_SESSION_COUNT};
pub use json_contract::{
    CHART_CONFIG_JSON_SCHEMA_V1, CHART_SNAPSHOT_JSON_SCHEMA_V1, ChartConfigJsonContractV1,
    ChartSnapshotJsonContractV1,
};
pub use price_chart::PriceChart;
pub use snapshot::ChartSnapshot;
