// Water-quality sample tables
//
// Uploaded CSV tables of sensor samples (depth, temperature, pH, dissolved
// oxygen, optionally position and date). Used as the feature source for ODO
// prediction and as the input to summary views.

pub mod samples;
pub mod summary;

pub use samples::{read_samples, SampleColumn, SampleTable, ValidationError, WaterSample};
pub use summary::{monthly_averages, MonthlyAverage, SampleAverages};
