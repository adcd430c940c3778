pub mod blob;
pub mod formats;
pub mod job;
pub mod output;
pub mod params;
pub mod query;

pub use crate::domain::model::{JobDetails, JobListQuery, JobStatus};
pub use crate::domain::ports::{BlobStore, QuantumService};
pub use crate::utils::error::Result;
