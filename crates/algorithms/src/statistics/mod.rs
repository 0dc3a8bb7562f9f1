//! Field-level statistics

mod field;

pub use field::{
    area_hectares, field_statistics, summarize_index, FieldStats, IndexSummary, ZonePercentages,
};
