//! Timestamped sample series and calendar helpers.

mod resample;
mod series;

pub use resample::{business_day_fill, resample_sum, split_trading_days};
pub use series::{Resolution, SampleSeries};
