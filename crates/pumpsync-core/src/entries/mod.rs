//! One mapper per upstream category. Each turns a raw record into its canonical entry.

mod basal;
mod bolus;
mod cgm;
mod iob;
mod suspension;

pub use basal::{normalize_export_basal, normalize_stream_basal};
pub use bolus::normalize_bolus;
pub use cgm::normalize_cgm_reading;
pub use iob::normalize_iob_snapshot;
pub use suspension::normalize_suspension;
