// NDBC buoy feed module
//
// Handles the real-time "realtime2" text feeds published by the National Data
// Buoy Center. A feed has two header lines (column names, then units) followed
// by whitespace-delimited observation rows, most recent first.

pub mod feed_parser;
pub mod reading;
pub mod statistics;

pub use feed_parser::FeedParser;
pub use reading::{BuoyColumn, BuoyReading};
pub use statistics::{describe, ColumnStatistics};
