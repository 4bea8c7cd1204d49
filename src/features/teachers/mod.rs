//! Teacher lookups. Course records only carry a `teacherId`, so views resolve
//! names through [`TeacherInfoCache`], which keeps one request per teacher for
//! the lifetime of the process.

pub mod cache;
pub mod client;
pub mod types;

pub use cache::TeacherInfoCache;
pub use types::TeacherInfo;
