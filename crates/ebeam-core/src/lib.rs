//! Electron-beam phase-space statistics: conversions between second moments,
//! size/divergence pairs and Twiss optics with dispersion, together with the
//! validated form-state model that front-ends resolve into a beam.

pub mod beam;
pub mod domain;
pub mod numerics;
pub mod serialization;
pub mod settings;

pub use beam::{ElectronBeam, RepresentationMode};
pub use domain::{BeamError, BeamErrorCategory, BeamResult, Plane};
pub use settings::{BeamSettings, Resolution, resolve, resolve_non_interactive};
