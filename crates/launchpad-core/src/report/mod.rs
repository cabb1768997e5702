pub mod model;

pub use model::{ReportCatalog, ReportSpec, ReportStatus, ReportType};
