//! Pure computations over already-fetched series: period returns, chart
//! labels and banking (H.8) changes.

pub mod banking;
pub mod labels;
pub mod returns;
