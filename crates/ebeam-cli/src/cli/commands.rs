use super::helpers::{
    confirm_on_terminal, emit_settings, print_settings_json, render_stale_fields,
};
use super::{CliError, EXIT_REVERTED};
use ebeam_core::beam::{
    Dispersion, PlaneMoments, RepresentationMode, TwissParameters, render_beam_summary,
    twiss_to_moments,
};
use ebeam_core::domain::{ConsistencyCheck, Plane};
use ebeam_core::serialization::{
    load_beam_settings, load_syned_electron_beam, write_syned_electron_beam,
};
use ebeam_core::settings::{Resolution, resolve};
use ebeam_core::BeamSettings;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct DefaultsArgs {
    /// Write the settings to this path instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    /// Beam settings JSON file
    settings: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct ResolveArgs {
    /// Beam settings JSON file
    settings: PathBuf,

    /// Accept dropping eta/eta' without prompting
    #[arg(long, conflicts_with = "deny_lossy")]
    allow_lossy: bool,

    /// Decline dropping eta/eta' without prompting (reverts to Twiss)
    #[arg(long)]
    deny_lossy: bool,

    /// Write the repopulated (or reverted) settings to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the resolved beam as a syned electron beam JSON file
    #[arg(long)]
    beam_output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ImportArgs {
    /// Syned electron beam (or light source) JSON file
    syned: PathBuf,

    /// Representation to mark authoritative (0-3); defaults to Twiss when the
    /// beam carries dispersion and to second moments otherwise
    #[arg(long)]
    mode: Option<u8>,

    /// Write the settings to this path instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PlaneArg {
    Horizontal,
    Vertical,
}

impl From<PlaneArg> for Plane {
    fn from(plane: PlaneArg) -> Self {
        match plane {
            PlaneArg::Horizontal => Plane::Horizontal,
            PlaneArg::Vertical => Plane::Vertical,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct TwissArgs {
    /// Emittance [m.rad]
    #[arg(long, allow_negative_numbers = true)]
    emittance: f64,

    /// Twiss alpha
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alpha: f64,

    /// Twiss beta [m]
    #[arg(long, allow_negative_numbers = true)]
    beta: f64,

    /// Dispersion eta [m]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    eta: f64,

    /// Dispersion derivative eta'
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    etap: f64,

    /// Relative energy spread dE/E
    #[arg(long, default_value_t = 0.0)]
    energy_spread: f64,

    #[arg(long, value_enum, default_value = "horizontal")]
    plane: PlaneArg,
}

pub(super) fn run_defaults_command(args: DefaultsArgs) -> Result<i32, CliError> {
    emit_settings(&BeamSettings::default(), args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let settings = load_beam_settings(&args.settings)?;
    let stale = settings.stale_views()?;
    println!(
        "Settings valid ({}): {}",
        settings.type_of_properties,
        args.settings.display()
    );
    println!("{}", render_stale_fields(&stale));
    Ok(0)
}

pub(super) fn run_resolve_command(args: ResolveArgs) -> Result<i32, CliError> {
    let settings = load_beam_settings(&args.settings)?;
    let resolution = if args.allow_lossy || args.deny_lossy {
        let allow = args.allow_lossy;
        resolve(&settings, |_| allow)?
    } else {
        resolve(&settings, confirm_on_terminal)?
    };

    match &resolution {
        Resolution::Produced { beam, settings } => {
            println!("{}", render_beam_summary(beam)?);
            if let Some(path) = args.output.as_deref() {
                emit_settings(settings, Some(path))?;
            }
            if let Some(path) = args.beam_output.as_deref() {
                write_syned_electron_beam(path, beam)?;
                println!("Beam written to {}", path.display());
            }
            Ok(0)
        }
        Resolution::Reverted(settings) => {
            println!(
                "Dispersion kept: representation reverted to {}; no beam produced.",
                RepresentationMode::Twiss
            );
            if let Some(path) = args.output.as_deref() {
                emit_settings(settings, Some(path))?;
            }
            Ok(EXIT_REVERTED)
        }
    }
}

pub(super) fn run_import_command(args: ImportArgs) -> Result<i32, CliError> {
    let beam = load_syned_electron_beam(&args.syned)?;
    let mode = match args.mode {
        Some(index) => RepresentationMode::try_from(index)?,
        None if beam.dispersion().is_zero() => RepresentationMode::Moments,
        None => RepresentationMode::Twiss,
    };
    let template = BeamSettings {
        type_of_properties: mode,
        flag_energy_spread: beam.energy_spread() > 0.0,
        ..BeamSettings::default()
    };
    let settings = template.populate_from_beam(&beam)?;
    tracing::info!(mode = mode.index(), path = %args.syned.display(), "imported syned beam");

    match args.output.as_deref() {
        Some(path) => emit_settings(&settings, Some(path))?,
        None => print_settings_json(&settings)?,
    }
    Ok(0)
}

pub(super) fn run_twiss_command(args: TwissArgs) -> Result<i32, CliError> {
    let plane = Plane::from(args.plane);
    let moments: PlaneMoments = twiss_to_moments(
        &TwissParameters::new(args.emittance, args.alpha, args.beta),
        Dispersion::new(args.eta, args.etap),
        args.energy_spread,
        plane,
        ConsistencyCheck::Enabled,
    )?;

    println!("{plane} plane");
    println!("<qq>   = {:e} m^2", moments.qq);
    println!("<qq'>  = {:e} m.rad", moments.qqp);
    println!("<q'q'> = {:e} rad^2", moments.qpqp);
    println!("sigma  = {:e} m", moments.qq.sqrt());
    println!("sigma' = {:e} rad", moments.qpqp.sqrt());
    Ok(0)
}
