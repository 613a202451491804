use ebeam_core::beam::{
    BeamMoments, Correlations, Dispersion, PlaneMoments, TwissParameters, moments_to_sigmas,
    sigmas_to_moments, twiss_to_moments,
};
use ebeam_core::domain::{BeamError, ConsistencyCheck, Plane};
use ebeam_core::numerics::round_to_decimals;
use ebeam_core::settings::{Resolution, resolve};
use ebeam_core::{BeamSettings, RepresentationMode};

fn assert_close(actual: f64, expected: f64, decimals: u32, label: &str) {
    let tolerance = 10f64.powi(-(decimals as i32));
    assert!(
        (actual - expected).abs() <= tolerance,
        "{label}: actual={actual:e} expected={expected:e}"
    );
}

#[test]
fn uncorrelated_moments_survive_sigma_round_trip() {
    let cases = [
        (0.0, 0.0, 0.0, 0.0),
        (1.521e-9, 9.61e-10, 1.53664e-9, 1.53664e-9),
        (2.5e-7, 1.0e-12, 3.3e-13, 4.0e-6),
        (1.0, 0.25, 4.0e-2, 9.0),
    ];

    for (xx, xpxp, yy, ypyp) in cases {
        let moments = BeamMoments::new(
            PlaneMoments::new(xx, 0.0, xpxp),
            PlaneMoments::new(yy, 0.0, ypyp),
        );
        let sigmas = moments_to_sigmas(&moments).expect("non-negative variances");
        let recovered = sigmas_to_moments(&sigmas, Correlations::default());

        assert_close(recovered.horizontal.qq, xx, 10, "<xx>");
        assert_close(recovered.horizontal.qpqp, xpxp, 10, "<x'x'>");
        assert_close(recovered.vertical.qq, yy, 10, "<yy>");
        assert_close(recovered.vertical.qpqp, ypyp, 10, "<y'y'>");
        assert_eq!(recovered.horizontal.qqp, 0.0);
        assert_eq!(recovered.vertical.qqp, 0.0);
    }
}

#[test]
fn unit_beta_twiss_sits_on_the_psd_boundary() {
    let moments = twiss_to_moments(
        &TwissParameters::new(1.0e-9, 0.0, 1.0),
        Dispersion::NONE,
        0.0,
        Plane::Horizontal,
        ConsistencyCheck::Enabled,
    )
    .expect("consistency check should pass");

    assert_eq!(moments.qq, 1.0e-9);
    assert_eq!(moments.qqp, 0.0);
    assert_eq!(moments.qpqp, 1.0e-9);
}

#[test]
fn negative_position_variance_is_a_domain_error() {
    let moments = BeamMoments::new(
        PlaneMoments::new(-1.0e-6, 0.0, 1.0e-10),
        PlaneMoments::new(1.0e-10, 0.0, 1.0e-10),
    );
    let error = moments_to_sigmas(&moments).expect_err("negative variance");
    assert!(matches!(error, BeamError::Domain { .. }), "{error:?}");
}

#[test]
fn negative_beta_is_inconsistent_for_the_supplied_plane() {
    for emittance in [1.0e-12, 1.0e-9, 3.0e-6] {
        let error = twiss_to_moments(
            &TwissParameters::new(emittance, 0.0, -1.0),
            Dispersion::NONE,
            0.0,
            Plane::Horizontal,
            ConsistencyCheck::Enabled,
        )
        .expect_err("negative beta");

        match &error {
            BeamError::InconsistentTwiss { plane, .. } => {
                assert_eq!(*plane, Plane::Horizontal);
                assert!(error.to_string().starts_with("Horizontal"));
            }
            other => panic!("expected inconsistent twiss, got {other:?}"),
        }
    }
}

#[test]
fn declined_switch_away_from_dispersive_twiss_keeps_twiss_fields() {
    let twiss = BeamSettings {
        electron_energy_spread: 1.0e-3,
        electron_beam_emittance_h: 1.3e-10,
        electron_beam_alpha_h: -0.3,
        electron_beam_beta_h: 6.1,
        electron_beam_eta_h: 1.0e-3,
        electron_beam_etap_h: 0.0,
        electron_beam_emittance_v: 1.0e-11,
        electron_beam_beta_v: 3.2,
        type_of_properties: RepresentationMode::Twiss,
        ..BeamSettings::default()
    };
    let requested = BeamSettings {
        type_of_properties: RepresentationMode::Moments,
        ..twiss
    };

    let resolution = resolve(&requested, |_| false).expect("declining is not an error");
    let Resolution::Reverted(reverted) = resolution else {
        panic!("expected the switch to revert");
    };

    assert_eq!(reverted.type_of_properties, RepresentationMode::Twiss);
    assert_eq!(reverted, twiss);
    assert_eq!(reverted.electron_beam_eta_h, 1.0e-3);
}

#[test]
fn energy_failure_is_reported_before_ring_current() {
    let settings = BeamSettings {
        electron_energy_in_gev: -1.0,
        ring_current: -1.0,
        ..BeamSettings::default()
    };
    let error = settings.check_data().expect_err("both fields invalid");
    assert_eq!(error.field(), Some("Energy"));
    assert_ne!(error.field(), Some("Ring Current"));
}

#[test]
fn resolved_views_agree_with_their_display_precision() {
    let settings = BeamSettings {
        electron_energy_in_gev: 6.0,
        electron_energy_spread: 9.3e-4,
        ring_current: 0.2,
        moment_xx: 9.0e-10,
        moment_xxp: -1.2e-11,
        moment_xpxp: 2.5e-11,
        moment_yy: 1.0e-11,
        moment_yyp: 0.0,
        moment_ypyp: 4.0e-12,
        type_of_properties: RepresentationMode::Moments,
        ..BeamSettings::default()
    };

    let resolution = resolve(&settings, |_| panic!("no dispersion stored")).expect("ok");
    let populated = resolution.settings();

    assert_eq!(populated.moment_xx, round_to_decimals(9.0e-10, 16));
    assert_eq!(populated.moment_xxp, -1.2e-11);
    assert_eq!(
        populated.electron_beam_size_h,
        round_to_decimals(9.0e-10_f64.sqrt(), 10)
    );

    let emittance = (9.0e-10_f64 * 2.5e-11 - 1.2e-11 * 1.2e-11).sqrt();
    assert_eq!(
        populated.electron_beam_emittance_h,
        round_to_decimals(emittance, 16)
    );
    assert_close(populated.electron_beam_beta_h, 9.0e-10 / emittance, 6, "beta_h");
    assert_close(populated.electron_beam_alpha_h, 1.2e-11 / emittance, 6, "alpha_h");
    assert!(populated.stale_views().expect("stale views").is_empty());
}
