use super::{
    BeamSettings, EMITTANCE_DECIMALS, MOMENT_DECIMALS, OPTICS_DECIMALS, SIGMA_DECIMALS,
};
use crate::beam::{ElectronBeam, RepresentationMode};
use crate::domain::BeamResult;
use crate::numerics::NumericTolerance;

pub const LOSSY_TRANSITION_PROMPT: &str =
    "This operation will set \u{03B7}, \u{03B7}' to zero and recompute the twiss parameters, proceed?";

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A beam was built; `settings` holds every view repopulated from it.
    Produced {
        beam: ElectronBeam,
        settings: BeamSettings,
    },
    /// The dispersion-dropping switch was declined. The settings are the
    /// input ones with the selector put back on Twiss; no beam exists.
    Reverted(BeamSettings),
}

impl Resolution {
    pub fn beam(&self) -> Option<&ElectronBeam> {
        match self {
            Self::Produced { beam, .. } => Some(beam),
            Self::Reverted(_) => None,
        }
    }

    pub fn settings(&self) -> &BeamSettings {
        match self {
            Self::Produced { settings, .. } | Self::Reverted(settings) => settings,
        }
    }

    pub fn is_reverted(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }
}

/// Validates `settings`, builds the beam from the authoritative group and
/// repopulates every view from it.
///
/// When the selector is on moments or size/divergence while η or η' are
/// still stored, adopting the beam would zero them; `confirm` is asked with
/// [`LOSSY_TRANSITION_PROMPT`] and a `false` answer reverts the selector to
/// Twiss instead.
pub fn resolve<F>(settings: &BeamSettings, mut confirm: F) -> BeamResult<Resolution>
where
    F: FnMut(&str) -> bool,
{
    settings.check_data()?;

    let beam = ElectronBeam::from_input(&settings.authoritative_input())?;
    let mode = settings.type_of_properties;

    if mode.drops_dispersion() && settings.dispersion_differs_from(&beam) {
        if !confirm(LOSSY_TRANSITION_PROMPT) {
            tracing::warn!(
                requested = mode.index(),
                "dispersion-dropping switch declined; staying on Twiss parameters"
            );
            let reverted = BeamSettings {
                type_of_properties: RepresentationMode::Twiss,
                ..*settings
            };
            return Ok(Resolution::Reverted(reverted));
        }
        tracing::warn!(
            requested = mode.index(),
            "dispersion-dropping switch accepted; eta and eta' set to zero"
        );
    }

    let populated = settings.populate_from_beam(&beam)?;
    tracing::debug!(mode = mode.index(), "electron beam resolved");
    Ok(Resolution::Produced {
        beam,
        settings: populated,
    })
}

/// [`resolve`] for callers that cannot prompt: `allow_lossy` answers the
/// confirmation up front.
pub fn resolve_non_interactive(
    settings: &BeamSettings,
    allow_lossy: bool,
) -> BeamResult<Resolution> {
    resolve(settings, |_| allow_lossy)
}

/// A stored, non-authoritative field that no longer matches the view
/// derived from the authoritative group.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleField {
    pub field: &'static str,
    pub stored: f64,
    pub derived: f64,
}

type FieldAccessor = (&'static str, fn(&BeamSettings) -> f64);

const MOMENT_FIELDS: [FieldAccessor; 6] = [
    ("moment_xx", |s| s.moment_xx),
    ("moment_xxp", |s| s.moment_xxp),
    ("moment_xpxp", |s| s.moment_xpxp),
    ("moment_yy", |s| s.moment_yy),
    ("moment_yyp", |s| s.moment_yyp),
    ("moment_ypyp", |s| s.moment_ypyp),
];

const SIGMA_FIELDS: [FieldAccessor; 4] = [
    ("electron_beam_size_h", |s| s.electron_beam_size_h),
    ("electron_beam_divergence_h", |s| s.electron_beam_divergence_h),
    ("electron_beam_size_v", |s| s.electron_beam_size_v),
    ("electron_beam_divergence_v", |s| s.electron_beam_divergence_v),
];

const EMITTANCE_FIELDS: [FieldAccessor; 2] = [
    ("electron_beam_emittance_h", |s| s.electron_beam_emittance_h),
    ("electron_beam_emittance_v", |s| s.electron_beam_emittance_v),
];

const OPTICS_FIELDS: [FieldAccessor; 4] = [
    ("electron_beam_alpha_h", |s| s.electron_beam_alpha_h),
    ("electron_beam_alpha_v", |s| s.electron_beam_alpha_v),
    ("electron_beam_beta_h", |s| s.electron_beam_beta_h),
    ("electron_beam_beta_v", |s| s.electron_beam_beta_v),
];

impl BeamSettings {
    /// Fields of the derived views that disagree with a fresh resolution by
    /// more than their display rounding. The authoritative group is never
    /// reported, and dispersion is left out since it is not derived.
    pub fn stale_views(&self) -> BeamResult<Vec<StaleField>> {
        self.check_data()?;
        let beam = ElectronBeam::from_input(&self.authoritative_input())?;
        let fresh = self.populate_from_beam(&beam)?;
        let fresh = &fresh;

        let groups: [(RepresentationMode, &[FieldAccessor], NumericTolerance); 4] = [
            (
                RepresentationMode::Moments,
                &MOMENT_FIELDS,
                NumericTolerance::for_rounding(MOMENT_DECIMALS),
            ),
            (
                RepresentationMode::SigmaDivergence,
                &SIGMA_FIELDS,
                NumericTolerance::for_rounding(SIGMA_DECIMALS),
            ),
            (
                RepresentationMode::Twiss,
                &EMITTANCE_FIELDS,
                NumericTolerance::for_rounding(EMITTANCE_DECIMALS),
            ),
            (
                RepresentationMode::Twiss,
                &OPTICS_FIELDS,
                NumericTolerance::for_rounding(OPTICS_DECIMALS),
            ),
        ];

        Ok(groups
            .into_iter()
            .filter(|(owner, _, _)| *owner != self.type_of_properties)
            .flat_map(|(_, fields, tolerance)| {
                fields.iter().filter_map(move |&(field, read)| {
                    let stored = read(self);
                    let derived = read(fresh);
                    (!tolerance.accepts(stored, derived)).then_some(StaleField {
                        field,
                        stored,
                        derived,
                    })
                })
            })
            .collect())
    }
}
