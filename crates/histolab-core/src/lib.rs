//! Histolab Core - Intensity transforms and histogram statistics
//!
//! This crate contains the grayscale image store, the histogram vectors, the
//! lookup-table transform engine, the three-slot editing session, and the
//! port traits adapters implement.

pub mod domain;
pub mod engine;
pub mod ports;
pub mod session;

pub use domain::{
    Error, HistogramSummary, Histograms, ImageDimensions, ImageReport, IntensityImage, Result,
    Transform, TransformDefaults, TransformKind,
};
pub use engine::{apply_transform, Lut};
pub use ports::{ProgressEvent, ProgressSink, ReportOutput, SampleCatalog};
pub use session::{Session, SessionOp, Slot};
