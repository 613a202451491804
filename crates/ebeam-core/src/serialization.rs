//! JSON persistence for beam settings and for syned-style electron beam
//! documents.

use crate::beam::{BeamDispersion, BeamMoments, Dispersion, ElectronBeam, PlaneMoments};
use crate::domain::{BeamError, BeamResult, Constraint};
use crate::settings::BeamSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ELECTRON_BEAM_CLASS_NAME: &str = "ElectronBeam";

/// Electron beam as stored by syned: moments plus dispersion, no derived views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynedElectronBeam {
    #[serde(rename = "CLASS_NAME", default = "default_class_name")]
    pub class_name: String,
    #[serde(rename = "energy_in_GeV")]
    pub energy_in_gev: f64,
    #[serde(default)]
    pub energy_spread: f64,
    pub current: f64,
    #[serde(default = "default_number_of_bunches")]
    pub number_of_bunches: u32,
    #[serde(default)]
    pub moment_xx: f64,
    #[serde(default)]
    pub moment_xxp: f64,
    #[serde(default)]
    pub moment_xpxp: f64,
    #[serde(default)]
    pub moment_yy: f64,
    #[serde(default)]
    pub moment_yyp: f64,
    #[serde(default)]
    pub moment_ypyp: f64,
    #[serde(default)]
    pub dispersion_x: f64,
    #[serde(default)]
    pub dispersion_y: f64,
    #[serde(default)]
    pub dispersionp_x: f64,
    #[serde(default)]
    pub dispersionp_y: f64,
}

fn default_class_name() -> String {
    ELECTRON_BEAM_CLASS_NAME.to_string()
}

fn default_number_of_bunches() -> u32 {
    1
}

impl SynedElectronBeam {
    pub fn from_beam(beam: &ElectronBeam) -> Self {
        let moments = beam.moments();
        let dispersion = beam.dispersion();
        Self {
            class_name: default_class_name(),
            energy_in_gev: beam.energy_gev(),
            energy_spread: beam.energy_spread(),
            current: beam.current_a(),
            number_of_bunches: default_number_of_bunches(),
            moment_xx: moments.horizontal.qq,
            moment_xxp: moments.horizontal.qqp,
            moment_xpxp: moments.horizontal.qpqp,
            moment_yy: moments.vertical.qq,
            moment_yyp: moments.vertical.qqp,
            moment_ypyp: moments.vertical.qpqp,
            dispersion_x: dispersion.horizontal.eta,
            dispersion_y: dispersion.vertical.eta,
            dispersionp_x: dispersion.horizontal.etap,
            dispersionp_y: dispersion.vertical.etap,
        }
    }

    /// Checks the scalars and the diagonal moments, then builds the beam.
    pub fn to_beam(&self) -> BeamResult<ElectronBeam> {
        if self.class_name != ELECTRON_BEAM_CLASS_NAME {
            return Err(BeamError::Internal(format!(
                "expected a '{}' document, found '{}'",
                ELECTRON_BEAM_CLASS_NAME, self.class_name
            )));
        }
        Constraint::StrictlyPositive.check(self.energy_in_gev, "energy_in_GeV")?;
        Constraint::NonNegative.check(self.energy_spread, "energy_spread")?;
        Constraint::StrictlyPositive.check(self.current, "current")?;
        Constraint::NonNegative.check(self.moment_xx, "moment_xx")?;
        Constraint::NonNegative.check(self.moment_xpxp, "moment_xpxp")?;
        Constraint::NonNegative.check(self.moment_yy, "moment_yy")?;
        Constraint::NonNegative.check(self.moment_ypyp, "moment_ypyp")?;

        Ok(ElectronBeam::from_moments(
            self.energy_in_gev,
            self.energy_spread,
            self.current,
            BeamMoments::new(
                PlaneMoments::new(self.moment_xx, self.moment_xxp, self.moment_xpxp),
                PlaneMoments::new(self.moment_yy, self.moment_yyp, self.moment_ypyp),
            ),
            BeamDispersion {
                horizontal: Dispersion::new(self.dispersion_x, self.dispersionp_x),
                vertical: Dispersion::new(self.dispersion_y, self.dispersionp_y),
            },
        ))
    }
}

/// A bare electron beam, or a light source that embeds one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SynedDocument {
    LightSource { electron_beam: SynedElectronBeam },
    ElectronBeam(SynedElectronBeam),
}

pub fn load_beam_settings(path: impl AsRef<Path>) -> BeamResult<BeamSettings> {
    let path = path.as_ref();
    let source = read_source(path)?;
    serde_json::from_str(&source).map_err(|source| BeamError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_beam_settings(path: impl AsRef<Path>, settings: &BeamSettings) -> BeamResult<()> {
    write_json(path.as_ref(), settings)
}

pub fn load_syned_electron_beam(path: impl AsRef<Path>) -> BeamResult<ElectronBeam> {
    let path = path.as_ref();
    let source = read_source(path)?;
    let document: SynedDocument =
        serde_json::from_str(&source).map_err(|source| BeamError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let beam = match document {
        SynedDocument::LightSource { electron_beam } | SynedDocument::ElectronBeam(electron_beam) => {
            electron_beam
        }
    };
    tracing::debug!(path = %path.display(), "loaded syned electron beam");
    beam.to_beam()
}

pub fn write_syned_electron_beam(path: impl AsRef<Path>, beam: &ElectronBeam) -> BeamResult<()> {
    write_json(path.as_ref(), &SynedElectronBeam::from_beam(beam))
}

fn read_source(path: &Path) -> BeamResult<String> {
    fs::read_to_string(path).map_err(|source| BeamError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> BeamResult<()> {
    let mut rendered = serde_json::to_string_pretty(value)
        .map_err(|error| BeamError::Internal(format!("failed to render JSON: {error}")))?;
    rendered.push('\n');

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BeamError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, rendered).map_err(|source| BeamError::Write {
        path: path.to_path_buf(),
        source,
    })
}
