//! wf-analysis - Analysis over Weft provenance graphs
//!
//! This crate infers the order in which schemas must be considered from a
//! provenance graph that merges several schemas (see [`infer_schema_dag`]).

pub mod error;
pub mod spider;

pub use error::{AnalysisError, AnalysisResult};
pub use spider::{infer_schema_dag, SchemaDag};
