// Caller layer around hoopval-core: configuration, data loading, cohort
// selection, roster resolution and the end-to-end report.

pub mod cohort;
pub mod config;
pub mod loader;
pub mod pipeline;
pub mod playoff;
pub mod roster;
