//! UI building blocks: the dependency graph and the download-history chart.

pub mod dependency_graph;
pub mod trace_chart;
