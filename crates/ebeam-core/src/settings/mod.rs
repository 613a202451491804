//! Flat form state for an electron beam: every field of every
//! representation, as a front-end keeps them, plus the selector saying which
//! group is authoritative.

mod resolution;

pub use resolution::{
    LOSSY_TRANSITION_PROMPT, Resolution, StaleField, resolve, resolve_non_interactive,
};

use crate::beam::{
    BeamInput, BeamMoments, BeamProperties, BeamSigmas, Dispersion, ElectronBeam, PlaneMoments,
    PlaneOptics, PlaneSigmas, RepresentationMode, TwissParameters, twiss_to_moments,
};
use crate::domain::{BeamResult, ConsistencyCheck, Constraint, Plane};
use crate::numerics::round_to_decimals;
use serde::{Deserialize, Serialize};

pub const MOMENT_DECIMALS: u32 = 16;
pub const SIGMA_DECIMALS: u32 = 10;
pub const EMITTANCE_DECIMALS: u32 = 16;
pub const OPTICS_DECIMALS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSettings {
    #[serde(rename = "electron_energy_in_GeV")]
    pub electron_energy_in_gev: f64,
    pub electron_energy_spread: f64,
    pub ring_current: f64,

    pub moment_xx: f64,
    pub moment_xxp: f64,
    pub moment_xpxp: f64,
    pub moment_yy: f64,
    pub moment_yyp: f64,
    pub moment_ypyp: f64,

    pub electron_beam_size_h: f64,
    pub electron_beam_divergence_h: f64,
    pub electron_beam_size_v: f64,
    pub electron_beam_divergence_v: f64,

    pub electron_beam_emittance_h: f64,
    pub electron_beam_emittance_v: f64,
    pub electron_beam_beta_h: f64,
    pub electron_beam_beta_v: f64,
    pub electron_beam_alpha_h: f64,
    pub electron_beam_alpha_v: f64,
    pub electron_beam_eta_h: f64,
    pub electron_beam_eta_v: f64,
    pub electron_beam_etap_h: f64,
    pub electron_beam_etap_v: f64,

    pub type_of_properties: RepresentationMode,
    #[serde(with = "flag_as_int")]
    pub flag_energy_spread: bool,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            electron_energy_in_gev: 1.9,
            electron_energy_spread: 0.0,
            ring_current: 0.4,
            moment_xx: 0.0,
            moment_xxp: 0.0,
            moment_xpxp: 0.0,
            moment_yy: 0.0,
            moment_yyp: 0.0,
            moment_ypyp: 0.0,
            electron_beam_size_h: 39e-6,
            electron_beam_divergence_h: 31e-6,
            electron_beam_size_v: 39.2e-6,
            electron_beam_divergence_v: 39.2e-6,
            electron_beam_emittance_h: 0.0,
            electron_beam_emittance_v: 0.0,
            electron_beam_beta_h: 0.0,
            electron_beam_beta_v: 0.0,
            electron_beam_alpha_h: 0.0,
            electron_beam_alpha_v: 0.0,
            electron_beam_eta_h: 0.0,
            electron_beam_eta_v: 0.0,
            electron_beam_etap_h: 0.0,
            electron_beam_etap_v: 0.0,
            type_of_properties: RepresentationMode::SigmaDivergence,
            flag_energy_spread: false,
        }
    }
}

impl BeamSettings {
    /// Fail-fast validation of the scalar fields and of the active
    /// representation's fields, in form order.
    pub fn check_data(&self) -> BeamResult<()> {
        Constraint::StrictlyPositive.check(self.electron_energy_in_gev, "Energy")?;
        Constraint::StrictlyPositive.check(self.electron_energy_spread, "Energy Spread")?;
        Constraint::StrictlyPositive.check(self.ring_current, "Ring Current")?;

        match self.type_of_properties {
            RepresentationMode::Moments => {
                Constraint::NonNegative.check(self.moment_xx, "Moment xx")?;
                Constraint::Finite.check(self.moment_xxp, "Moment xxp")?;
                Constraint::NonNegative.check(self.moment_xpxp, "Moment xpxp")?;
                Constraint::NonNegative.check(self.moment_yy, "Moment yy")?;
                Constraint::Finite.check(self.moment_yyp, "Moment yyp")?;
                Constraint::NonNegative.check(self.moment_ypyp, "Moment ypyp")?;
            }
            RepresentationMode::SigmaDivergence => {
                Constraint::NonNegative.check(self.electron_beam_size_h, "Horizontal Beam Size")?;
                Constraint::NonNegative
                    .check(self.electron_beam_divergence_h, "Horizontal Beam Divergence")?;
                Constraint::NonNegative.check(self.electron_beam_size_v, "Vertical Beam Size")?;
                Constraint::NonNegative
                    .check(self.electron_beam_divergence_v, "Vertical Beam Divergence")?;
            }
            RepresentationMode::Twiss => {
                Constraint::NonNegative
                    .check(self.electron_beam_emittance_h, "Horizontal Beam Emittance")?;
                Constraint::NonNegative
                    .check(self.electron_beam_emittance_v, "Vertical Beam Emittance")?;
                Constraint::Finite.check(self.electron_beam_alpha_h, "Horizontal Beam Alpha")?;
                Constraint::Finite.check(self.electron_beam_alpha_v, "Vertical Beam Alpha")?;
                Constraint::Finite.check(self.electron_beam_beta_h, "Horizontal Beam Beta")?;
                Constraint::Finite.check(self.electron_beam_beta_v, "Vertical Beam Beta")?;
                Constraint::Finite
                    .check(self.electron_beam_eta_h, "Horizontal Beam Dispersion Eta")?;
                Constraint::Finite.check(self.electron_beam_eta_v, "Vertical Beam Dispersion Eta")?;
                Constraint::Finite
                    .check(self.electron_beam_etap_h, "Horizontal Beam Dispersion Eta'")?;
                Constraint::Finite
                    .check(self.electron_beam_etap_v, "Vertical Beam Dispersion Eta'")?;

                for plane in Plane::ALL {
                    let optics = self.optics(plane);
                    twiss_to_moments(
                        &optics.twiss,
                        optics.dispersion,
                        self.electron_energy_spread,
                        plane,
                        ConsistencyCheck::Enabled,
                    )?;
                }
            }
            RepresentationMode::ZeroEmittance => {}
        }

        Ok(())
    }

    pub fn optics(&self, plane: Plane) -> PlaneOptics {
        match plane {
            Plane::Horizontal => PlaneOptics::new(
                TwissParameters::new(
                    self.electron_beam_emittance_h,
                    self.electron_beam_alpha_h,
                    self.electron_beam_beta_h,
                ),
                Dispersion::new(self.electron_beam_eta_h, self.electron_beam_etap_h),
            ),
            Plane::Vertical => PlaneOptics::new(
                TwissParameters::new(
                    self.electron_beam_emittance_v,
                    self.electron_beam_alpha_v,
                    self.electron_beam_beta_v,
                ),
                Dispersion::new(self.electron_beam_eta_v, self.electron_beam_etap_v),
            ),
        }
    }

    pub fn stored_dispersion(&self, plane: Plane) -> Dispersion {
        self.optics(plane).dispersion
    }

    pub fn moments(&self) -> BeamMoments {
        BeamMoments::new(
            PlaneMoments::new(self.moment_xx, self.moment_xxp, self.moment_xpxp),
            PlaneMoments::new(self.moment_yy, self.moment_yyp, self.moment_ypyp),
        )
    }

    pub fn sigmas(&self) -> BeamSigmas {
        BeamSigmas::new(
            PlaneSigmas::new(self.electron_beam_size_h, self.electron_beam_divergence_h),
            PlaneSigmas::new(self.electron_beam_size_v, self.electron_beam_divergence_v),
        )
    }

    /// The authoritative field group, selected by `type_of_properties`.
    pub fn authoritative_input(&self) -> BeamInput {
        let properties = match self.type_of_properties {
            RepresentationMode::Moments => BeamProperties::Moments(self.moments()),
            RepresentationMode::SigmaDivergence => BeamProperties::SigmaDivergence(self.sigmas()),
            RepresentationMode::Twiss => BeamProperties::Twiss {
                horizontal: self.optics(Plane::Horizontal),
                vertical: self.optics(Plane::Vertical),
            },
            RepresentationMode::ZeroEmittance => BeamProperties::ZeroEmittance,
        };

        BeamInput {
            energy_gev: self.electron_energy_in_gev,
            energy_spread: self.electron_energy_spread,
            current_a: self.ring_current,
            properties,
        }
    }

    /// True when the stored dispersion differs from the beam's, i.e. when
    /// adopting `beam` would discard η or η'.
    pub fn dispersion_differs_from(&self, beam: &ElectronBeam) -> bool {
        Plane::ALL
            .into_iter()
            .any(|plane| self.stored_dispersion(plane) != *beam.dispersion().plane(plane))
    }

    /// A copy of these settings with every field rewritten from `beam`,
    /// rounded the way the form displays them. The selector and the
    /// energy-spread flag are kept.
    pub fn populate_from_beam(&self, beam: &ElectronBeam) -> BeamResult<Self> {
        let moments = beam.moments();
        let dispersion = beam.dispersion();
        let sigmas = beam.sigmas()?;
        let twiss = beam.twiss()?;
        let moment = |value: f64| round_to_decimals(value, MOMENT_DECIMALS);
        let sigma = |value: f64| round_to_decimals(value, SIGMA_DECIMALS);
        let emittance = |value: f64| round_to_decimals(value, EMITTANCE_DECIMALS);
        let optic = |value: f64| round_to_decimals(value, OPTICS_DECIMALS);

        Ok(Self {
            electron_energy_in_gev: beam.energy_gev(),
            electron_energy_spread: beam.energy_spread(),
            ring_current: beam.current_a(),
            moment_xx: moment(moments.horizontal.qq),
            moment_xxp: moment(moments.horizontal.qqp),
            moment_xpxp: moment(moments.horizontal.qpqp),
            moment_yy: moment(moments.vertical.qq),
            moment_yyp: moment(moments.vertical.qqp),
            moment_ypyp: moment(moments.vertical.qpqp),
            electron_beam_size_h: sigma(sigmas.horizontal.size),
            electron_beam_divergence_h: sigma(sigmas.horizontal.divergence),
            electron_beam_size_v: sigma(sigmas.vertical.size),
            electron_beam_divergence_v: sigma(sigmas.vertical.divergence),
            electron_beam_emittance_h: emittance(twiss.horizontal.emittance),
            electron_beam_emittance_v: emittance(twiss.vertical.emittance),
            electron_beam_beta_h: optic(twiss.horizontal.beta),
            electron_beam_beta_v: optic(twiss.vertical.beta),
            electron_beam_alpha_h: optic(twiss.horizontal.alpha),
            electron_beam_alpha_v: optic(twiss.vertical.alpha),
            electron_beam_eta_h: dispersion.horizontal.eta,
            electron_beam_eta_v: dispersion.vertical.eta,
            electron_beam_etap_h: dispersion.horizontal.etap,
            electron_beam_etap_v: dispersion.vertical.etap,
            type_of_properties: self.type_of_properties,
            flag_energy_spread: self.flag_energy_spread,
        })
    }
}

/// The form stores the energy-spread switch as a 0/1 combo index.
mod flag_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "flag_energy_spread must be 0 or 1, got {other}"
            ))),
        }
    }
}
