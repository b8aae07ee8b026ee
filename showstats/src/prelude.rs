//! Prelude for commonly used types and traits in showstats.

pub use crate::classifier::VarType;
pub use crate::dataset::{Dataset, IntoDataset};
pub use crate::error::{ErrorContext, Result, StatsError};
pub use crate::logging::LogConfig;
pub use crate::presenter::{DisplayConfig, TableFormatter};
pub use crate::report::{StatsReport, TableType, TopValuesLayout};
pub use crate::table::StatsTable;
