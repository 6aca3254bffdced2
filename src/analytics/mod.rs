pub mod aggregator;
pub mod insights;
pub mod keywords;
pub mod recommendations;
pub mod report;
pub mod sentiment;
