pub mod dataset;
pub mod geometry;
pub mod overview;
pub mod period;
pub mod summary;

pub use dataset::{DatasetId, DatasetQuery, DatasetSummary};
pub use geometry::{Crs, Footprint, Geometry, GeometryType, ValidityMode};
pub use overview::{StoredOverview, TimePeriodOverview};
pub use period::{TimeBounds, TimeRange, TimelinePeriod};
pub use summary::{SummaryKey, SummaryState};
