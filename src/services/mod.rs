pub use ingest_service::IngestService;
pub use probe_service::{ProbeOutcome, ProbeService};

pub mod ingest_service;
pub mod probe_service;
