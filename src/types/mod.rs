//! Core types for the dimension clock

mod band;
mod input;
mod reason;
mod report;
mod status;

pub use band::{Band, BandReading, BandSnapshot, Telemetry};
pub use input::{InputEvent, InputKey, InputType};
pub use reason::ReasonCode;
pub use report::StatusReport;
pub use status::DimensionStatus;
