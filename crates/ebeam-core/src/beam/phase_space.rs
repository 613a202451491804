use crate::domain::Plane;
use serde::{Deserialize, Serialize};

/// Second moments of one transverse plane: `<qq>` [m^2], `<qq'>` [m.rad], `<q'q'>` [rad^2].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneMoments {
    pub qq: f64,
    pub qqp: f64,
    pub qpqp: f64,
}

impl PlaneMoments {
    pub const ZERO: PlaneMoments = PlaneMoments {
        qq: 0.0,
        qqp: 0.0,
        qpqp: 0.0,
    };

    pub const fn new(qq: f64, qqp: f64, qpqp: f64) -> Self {
        Self { qq, qqp, qpqp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamMoments {
    pub horizontal: PlaneMoments,
    pub vertical: PlaneMoments,
}

impl BeamMoments {
    pub const ZERO: BeamMoments = BeamMoments {
        horizontal: PlaneMoments::ZERO,
        vertical: PlaneMoments::ZERO,
    };

    pub const fn new(horizontal: PlaneMoments, vertical: PlaneMoments) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn plane(&self, plane: Plane) -> &PlaneMoments {
        match plane {
            Plane::Horizontal => &self.horizontal,
            Plane::Vertical => &self.vertical,
        }
    }
}

/// Beam size and divergence of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneSigmas {
    pub size: f64,
    pub divergence: f64,
}

impl PlaneSigmas {
    pub const fn new(size: f64, divergence: f64) -> Self {
        Self { size, divergence }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamSigmas {
    pub horizontal: PlaneSigmas,
    pub vertical: PlaneSigmas,
}

impl BeamSigmas {
    pub const fn new(horizontal: PlaneSigmas, vertical: PlaneSigmas) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// `(σx, σ'x, σy, σ'y)`
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (
            self.horizontal.size,
            self.horizontal.divergence,
            self.vertical.size,
            self.vertical.divergence,
        )
    }
}

/// Position/angle cross terms `<xx'>` and `<yy'>`, which sigmas alone cannot carry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Correlations {
    pub xxp: f64,
    pub yyp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dispersion {
    pub eta: f64,
    pub etap: f64,
}

impl Dispersion {
    pub const NONE: Dispersion = Dispersion {
        eta: 0.0,
        etap: 0.0,
    };

    pub const fn new(eta: f64, etap: f64) -> Self {
        Self { eta, etap }
    }

    pub fn is_zero(&self) -> bool {
        self.eta == 0.0 && self.etap == 0.0
    }

    /// Dispersive contribution to the second moments at relative energy spread `energy_spread`.
    pub fn moment_contribution(&self, energy_spread: f64) -> PlaneMoments {
        let variance = energy_spread * energy_spread;
        PlaneMoments {
            qq: self.eta * self.eta * variance,
            qqp: self.eta * self.etap * variance,
            qpqp: self.etap * self.etap * variance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamDispersion {
    pub horizontal: Dispersion,
    pub vertical: Dispersion,
}

impl BeamDispersion {
    pub const NONE: BeamDispersion = BeamDispersion {
        horizontal: Dispersion::NONE,
        vertical: Dispersion::NONE,
    };

    pub const fn plane(&self, plane: Plane) -> &Dispersion {
        match plane {
            Plane::Horizontal => &self.horizontal,
            Plane::Vertical => &self.vertical,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.horizontal.is_zero() && self.vertical.is_zero()
    }
}

/// Twiss optics of one plane, without dispersion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TwissParameters {
    pub emittance: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl TwissParameters {
    pub const COLLAPSED: TwissParameters = TwissParameters {
        emittance: 0.0,
        alpha: 0.0,
        beta: 0.0,
    };

    pub const fn new(emittance: f64, alpha: f64, beta: f64) -> Self {
        Self {
            emittance,
            alpha,
            beta,
        }
    }

    /// `γ = (1 + α²) / β`
    pub fn gamma(&self) -> f64 {
        (1.0 + self.alpha * self.alpha) / self.beta
    }
}

/// Twiss parameters together with the dispersion of the same plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneOptics {
    pub twiss: TwissParameters,
    pub dispersion: Dispersion,
}

impl PlaneOptics {
    pub const fn new(twiss: TwissParameters, dispersion: Dispersion) -> Self {
        Self { twiss, dispersion }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamTwiss {
    pub horizontal: TwissParameters,
    pub vertical: TwissParameters,
}

impl BeamTwiss {
    pub const fn plane(&self, plane: Plane) -> &TwissParameters {
        match plane {
            Plane::Horizontal => &self.horizontal,
            Plane::Vertical => &self.vertical,
        }
    }
}
