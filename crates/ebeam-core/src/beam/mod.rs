pub mod conversions;
pub mod phase_space;

pub use conversions::{
    is_positive_semidefinite, moments_to_sigmas, moments_to_twiss, sigmas_to_moments,
    twiss_to_moments,
};
pub use phase_space::{
    BeamDispersion, BeamMoments, BeamSigmas, BeamTwiss, Correlations, Dispersion, PlaneMoments,
    PlaneOptics, PlaneSigmas, TwissParameters,
};

use crate::domain::{BeamResult, ConsistencyCheck, Plane};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Electron rest energy in GeV.
pub const ELECTRON_REST_ENERGY_GEV: f64 = 0.510_998_950_00e-3;

/// Which description of the beam is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RepresentationMode {
    Moments,
    #[default]
    SigmaDivergence,
    Twiss,
    ZeroEmittance,
}

impl RepresentationMode {
    pub const fn index(self) -> u8 {
        match self {
            Self::Moments => 0,
            Self::SigmaDivergence => 1,
            Self::Twiss => 2,
            Self::ZeroEmittance => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Moments => "From 2nd Moments",
            Self::SigmaDivergence => "From Size/Divergence",
            Self::Twiss => "From Twiss parameters",
            Self::ZeroEmittance => "Zero emittance",
        }
    }

    /// Modes whose field set has no room for dispersion.
    pub const fn drops_dispersion(self) -> bool {
        matches!(self, Self::Moments | Self::SigmaDivergence)
    }
}

impl TryFrom<u8> for RepresentationMode {
    type Error = crate::domain::BeamError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Moments),
            1 => Ok(Self::SigmaDivergence),
            2 => Ok(Self::Twiss),
            3 => Ok(Self::ZeroEmittance),
            other => Err(crate::domain::BeamError::UnknownRepresentation(other)),
        }
    }
}

impl From<RepresentationMode> for u8 {
    fn from(mode: RepresentationMode) -> Self {
        mode.index()
    }
}

impl Display for RepresentationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).label())
    }
}

/// Authoritative field set of a beam, one variant per representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeamProperties {
    Moments(BeamMoments),
    SigmaDivergence(BeamSigmas),
    Twiss {
        horizontal: PlaneOptics,
        vertical: PlaneOptics,
    },
    ZeroEmittance,
}

impl BeamProperties {
    pub const fn mode(&self) -> RepresentationMode {
        match self {
            Self::Moments(_) => RepresentationMode::Moments,
            Self::SigmaDivergence(_) => RepresentationMode::SigmaDivergence,
            Self::Twiss { .. } => RepresentationMode::Twiss,
            Self::ZeroEmittance => RepresentationMode::ZeroEmittance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamInput {
    pub energy_gev: f64,
    pub energy_spread: f64,
    pub current_a: f64,
    pub properties: BeamProperties,
}

/// Statistical state of an electron beam.
///
/// Second moments and dispersion are stored; sigmas and Twiss optics are
/// derived on every read so they can never drift from the stored moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectronBeam {
    energy_gev: f64,
    energy_spread: f64,
    current_a: f64,
    moments: BeamMoments,
    dispersion: BeamDispersion,
}

impl ElectronBeam {
    /// Builds a beam from explicit moments. Dispersion is taken as given and is
    /// assumed to be already folded into `moments`.
    pub const fn from_moments(
        energy_gev: f64,
        energy_spread: f64,
        current_a: f64,
        moments: BeamMoments,
        dispersion: BeamDispersion,
    ) -> Self {
        Self {
            energy_gev,
            energy_spread,
            current_a,
            moments,
            dispersion,
        }
    }

    /// Pure builder from the authoritative representation. Twiss input is
    /// converted without the consistency check; callers validate first.
    pub fn from_input(input: &BeamInput) -> BeamResult<Self> {
        let (moments, dispersion) = match input.properties {
            BeamProperties::Moments(moments) => (moments, BeamDispersion::NONE),
            BeamProperties::SigmaDivergence(sigmas) => (
                sigmas_to_moments(&sigmas, Correlations::default()),
                BeamDispersion::NONE,
            ),
            BeamProperties::Twiss {
                horizontal,
                vertical,
            } => {
                let convert = |optics: &PlaneOptics, plane: Plane| {
                    twiss_to_moments(
                        &optics.twiss,
                        optics.dispersion,
                        input.energy_spread,
                        plane,
                        ConsistencyCheck::Disabled,
                    )
                };
                (
                    BeamMoments::new(
                        convert(&horizontal, Plane::Horizontal)?,
                        convert(&vertical, Plane::Vertical)?,
                    ),
                    BeamDispersion {
                        horizontal: horizontal.dispersion,
                        vertical: vertical.dispersion,
                    },
                )
            }
            BeamProperties::ZeroEmittance => (BeamMoments::ZERO, BeamDispersion::NONE),
        };

        tracing::debug!(
            mode = input.properties.mode().index(),
            energy_gev = input.energy_gev,
            "electron beam built"
        );
        Ok(Self::from_moments(
            input.energy_gev,
            input.energy_spread,
            input.current_a,
            moments,
            dispersion,
        ))
    }

    pub const fn energy_gev(&self) -> f64 {
        self.energy_gev
    }

    pub const fn energy_spread(&self) -> f64 {
        self.energy_spread
    }

    pub const fn current_a(&self) -> f64 {
        self.current_a
    }

    pub const fn moments(&self) -> &BeamMoments {
        &self.moments
    }

    pub const fn dispersion(&self) -> &BeamDispersion {
        &self.dispersion
    }

    pub fn lorentz_factor(&self) -> f64 {
        self.energy_gev / ELECTRON_REST_ENERGY_GEV
    }

    pub fn sigmas(&self) -> BeamResult<BeamSigmas> {
        moments_to_sigmas(&self.moments)
    }

    pub fn twiss(&self) -> BeamResult<BeamTwiss> {
        let plane_twiss = |plane: Plane| {
            moments_to_twiss(
                self.moments.plane(plane),
                *self.dispersion.plane(plane),
                self.energy_spread,
                plane,
            )
        };
        Ok(BeamTwiss {
            horizontal: plane_twiss(Plane::Horizontal)?,
            vertical: plane_twiss(Plane::Vertical)?,
        })
    }
}

pub fn render_beam_summary(beam: &ElectronBeam) -> BeamResult<String> {
    let sigmas = beam.sigmas()?;
    let twiss = beam.twiss()?;
    let moments = beam.moments();
    let dispersion = beam.dispersion();

    let mut lines = vec![
        format!(
            "Electron beam: E={} GeV, dE/E={:e}, I={} A, gamma={:.3}",
            beam.energy_gev(),
            beam.energy_spread(),
            beam.current_a(),
            beam.lorentz_factor()
        ),
        format!(
            "Moments H: <xx>={:e} <xx'>={:e} <x'x'>={:e}",
            moments.horizontal.qq, moments.horizontal.qqp, moments.horizontal.qpqp
        ),
        format!(
            "Moments V: <yy>={:e} <yy'>={:e} <y'y'>={:e}",
            moments.vertical.qq, moments.vertical.qqp, moments.vertical.qpqp
        ),
        format!(
            "Sigmas: sx={:e} m, sx'={:e} rad, sy={:e} m, sy'={:e} rad",
            sigmas.horizontal.size,
            sigmas.horizontal.divergence,
            sigmas.vertical.size,
            sigmas.vertical.divergence
        ),
    ];
    for plane in Plane::ALL {
        let plane_twiss = twiss.plane(plane);
        let plane_dispersion = dispersion.plane(plane);
        lines.push(format!(
            "Twiss {}: emittance={:e} m.rad, alpha={:.6}, beta={:.6} m, eta={}, eta'={}",
            plane,
            plane_twiss.emittance,
            plane_twiss.alpha,
            plane_twiss.beta,
            plane_dispersion.eta,
            plane_dispersion.etap
        ));
    }
    Ok(lines.join("\n"))
}
