//! Conversions between the three statistical descriptions of a transverse
//! phase-space distribution: second moments, size/divergence pairs and Twiss
//! optics (with dispersion).
//!
//! All functions are pure; the moment representation is the pivot between
//! the other two.

use super::phase_space::{
    BeamMoments, BeamSigmas, Correlations, Dispersion, PlaneMoments, PlaneSigmas,
    TwissParameters,
};
use crate::domain::{BeamError, BeamResult, ConsistencyCheck, Plane};
use crate::numerics::symmetric_determinant;

/// Relative slack allowed on `<qq><q'q'> - <qq'>²` before a moment set is called non-physical.
pub const DETERMINANT_RELATIVE_TOLERANCE: f64 = 1.0e-12;

pub fn moments_to_sigmas(moments: &BeamMoments) -> BeamResult<BeamSigmas> {
    let (x, xp) = plane_sigmas(&moments.horizontal, "<x x>", "<x' x'>")?;
    let (y, yp) = plane_sigmas(&moments.vertical, "<y y>", "<y' y'>")?;
    Ok(BeamSigmas::new(PlaneSigmas::new(x, xp), PlaneSigmas::new(y, yp)))
}

fn plane_sigmas(
    moments: &PlaneMoments,
    position_label: &str,
    angle_label: &str,
) -> BeamResult<(f64, f64)> {
    Ok((
        standard_deviation(moments.qq, position_label)?,
        standard_deviation(moments.qpqp, angle_label)?,
    ))
}

fn standard_deviation(variance: f64, label: &str) -> BeamResult<f64> {
    if variance.is_nan() || variance < 0.0 {
        return Err(BeamError::domain(
            label,
            format!("{variance} is not a valid variance"),
        ));
    }
    Ok(variance.sqrt())
}

/// Cross terms are taken from `correlations`; a bare size/divergence pair
/// implies zero correlation.
pub fn sigmas_to_moments(sigmas: &BeamSigmas, correlations: Correlations) -> BeamMoments {
    let horizontal = sigmas.horizontal;
    let vertical = sigmas.vertical;
    BeamMoments::new(
        PlaneMoments::new(
            horizontal.size * horizontal.size,
            correlations.xxp,
            horizontal.divergence * horizontal.divergence,
        ),
        PlaneMoments::new(
            vertical.size * vertical.size,
            correlations.yyp,
            vertical.divergence * vertical.divergence,
        ),
    )
}

/// Second moments of one plane from Twiss optics plus dispersion.
///
/// With the consistency check enabled the emittance and beta must both be
/// strictly positive. Unchecked, a zero emittance collapses the betatron part
/// of the plane and beta is not used.
pub fn twiss_to_moments(
    twiss: &TwissParameters,
    dispersion: Dispersion,
    energy_spread: f64,
    plane: Plane,
    check: ConsistencyCheck,
) -> BeamResult<PlaneMoments> {
    if check.is_enabled() {
        if twiss.emittance < 0.0 {
            return Err(BeamError::inconsistent_twiss(
                plane,
                format!("emittance {} is negative", twiss.emittance),
            ));
        }
        if twiss.beta <= 0.0 {
            return Err(BeamError::inconsistent_twiss(
                plane,
                format!("beta {} must be positive", twiss.beta),
            ));
        }
        if twiss.emittance == 0.0 {
            return Err(BeamError::inconsistent_twiss(
                plane,
                "zero emittance is only valid in the zero emittance representation",
            ));
        }
    }

    let betatron = if twiss.emittance == 0.0 {
        PlaneMoments::ZERO
    } else {
        if twiss.beta == 0.0 {
            return Err(BeamError::domain(
                format!("{plane} beta"),
                "beta is zero with a non-zero emittance",
            ));
        }
        PlaneMoments::new(
            twiss.emittance * twiss.beta,
            -twiss.emittance * twiss.alpha,
            twiss.emittance * twiss.gamma(),
        )
    };

    let dispersive = dispersion.moment_contribution(energy_spread);
    let moments = PlaneMoments::new(
        betatron.qq + dispersive.qq,
        betatron.qqp + dispersive.qqp,
        betatron.qpqp + dispersive.qpqp,
    );

    if check.is_enabled() && !is_positive_semidefinite(&moments) {
        return Err(BeamError::inconsistent_twiss(
            plane,
            format!(
                "moments <qq>={:e}, <qq'>={:e}, <q'q'>={:e} do not form a positive semidefinite covariance",
                moments.qq, moments.qqp, moments.qpqp
            ),
        ));
    }

    tracing::debug!(
        plane = plane.as_str(),
        qq = moments.qq,
        qqp = moments.qqp,
        qpqp = moments.qpqp,
        "twiss converted to second moments"
    );
    Ok(moments)
}

/// Twiss optics of one plane from its second moments, after removing the
/// dispersive contribution.
pub fn moments_to_twiss(
    moments: &PlaneMoments,
    dispersion: Dispersion,
    energy_spread: f64,
    plane: Plane,
) -> BeamResult<TwissParameters> {
    let dispersive = dispersion.moment_contribution(energy_spread);
    let qq = moments.qq - dispersive.qq;
    let qqp = moments.qqp - dispersive.qqp;
    let qpqp = moments.qpqp - dispersive.qpqp;

    for (label, betatron, total, removed) in [
        ("<qq>", qq, moments.qq, dispersive.qq),
        ("<q'q'>", qpqp, moments.qpqp, dispersive.qpqp),
    ] {
        let slack = DETERMINANT_RELATIVE_TOLERANCE * total.abs().max(removed.abs());
        if betatron.is_nan() || betatron < -slack {
            return Err(BeamError::domain(
                format!("{plane} emittance"),
                format!("betatron {label}={betatron:e} is negative after removing dispersion"),
            ));
        }
    }

    let determinant = symmetric_determinant(qq, qqp, qpqp);
    let slack = DETERMINANT_RELATIVE_TOLERANCE * (qq * qpqp).abs();
    if determinant.is_nan() || determinant < -slack {
        return Err(BeamError::domain(
            format!("{plane} emittance"),
            format!(
                "negative discriminant {determinant:e}: <qq><q'q'> < <qq'>² after removing dispersion"
            ),
        ));
    }

    if determinant <= 0.0 || qq <= 0.0 {
        return Ok(TwissParameters::COLLAPSED);
    }

    let emittance = determinant.sqrt();
    Ok(TwissParameters::new(emittance, -qqp / emittance, qq / emittance))
}

pub fn is_positive_semidefinite(moments: &PlaneMoments) -> bool {
    if moments.qq < 0.0 || moments.qpqp < 0.0 {
        return false;
    }
    let determinant = symmetric_determinant(moments.qq, moments.qqp, moments.qpqp);
    determinant >= -DETERMINANT_RELATIVE_TOLERANCE * moments.qq * moments.qpqp
}
