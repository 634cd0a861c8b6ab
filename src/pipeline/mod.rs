pub mod batch;
pub mod enrichment;
pub mod extraction;
