//! # Profile generator executable
//!
//! Reads the base configuration and path definitions from the root directory,
//! then writes `{name}_left.csv` and `{name}_right.csv` for every path. If
//! neither input changed since the last successful run nothing is done.
//!
//! Fatal errors are logged and reported through the exit code, see
//! [`GenError::exit_code`]. A settings file which cannot be loaded exits with
//! code 12, any other start up failure with code 1.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

// Internal
use profile_gen_lib::{
    pipeline::{self, GenError, RunOptions, RunOutcome},
    settings::Settings,
    traj_backend::HermiteBackend,
};
use util::{
    host,
    logger::{level_from_verbosity, logger_init},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Exit code used when the settings file cannot be loaded.
const SETTINGS_ERROR_EXIT_CODE: i32 = 12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generate tank drive motion profiles from path definitions.
#[derive(Debug, StructOpt)]
#[structopt(name = "profile_gen")]
struct Opts {
    /// Directory containing the inputs. Defaults to $PROFILE_GEN_ROOT, or the
    /// current directory if that isn't set.
    #[structopt(long, parse(from_os_str))]
    root: Option<PathBuf>,

    /// Settings file to use instead of `profile_gen.toml` in the root.
    #[structopt(long, parse(from_os_str))]
    settings: Option<PathBuf>,

    /// Directory to write the profiles to, relative to the root.
    #[structopt(long, parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// Write the profiles beside the inputs.
    #[structopt(long)]
    flat: bool,

    /// Regenerate even if the inputs are unchanged.
    #[structopt(short, long)]
    force: bool,

    /// Directory to write a log file to, relative to the root.
    #[structopt(long, parse(from_os_str))]
    log_dir: Option<PathBuf>,

    /// Increase the log level, may be given twice.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Only log warnings and errors.
    #[structopt(short, long)]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let root = match opts.root {
        Some(ref r) => r.clone(),
        None => host::get_root().wrap_err("Failed to get the root directory")?,
    };

    // Settings are loaded before the session since they may name the log
    // directory, errors are reported once logging is up.
    let settings = Settings::load(&root, opts.settings.as_deref());

    let log_dir = opts.log_dir.clone().or_else(|| {
        settings
            .as_ref()
            .ok()
            .and_then(|s| s.log_dir.clone())
    });

    let session = Session::new("profile_gen", &root, log_dir.as_deref())
        .wrap_err("Failed to create the session")?;

    logger_init(level_from_verbosity(opts.verbose, opts.quiet), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Profile Generator\n");
    info!("Root directory: {:?}", session.session_root);

    // ---- SETTINGS ----

    let mut settings = match settings {
        Ok(s) => s,
        Err(e) => {
            error!("Could not load settings: {}", e);
            process::exit(SETTINGS_ERROR_EXIT_CODE);
        }
    };

    if let Some(dir) = opts.output_dir {
        settings.output_dir = dir;
    }
    if opts.flat {
        settings.flat_output = true;
    }

    info!("Settings loaded: {:#?}", settings);

    // ---- GENERATION ----

    let run_opts = RunOptions {
        root,
        settings,
        force: opts.force,
    };

    match pipeline::run(&run_opts, &HermiteBackend) {
        Ok(RunOutcome::Skipped) => info!("Profiles are up to date"),
        Ok(RunOutcome::Generated { paths, .. }) => {
            for p in paths.iter() {
                info!(
                    "    {}: {} samples -> {:?}, {:?}",
                    p.name, p.num_segments, p.files.left, p.files.right
                );
                if p.num_warnings > 0 {
                    warn!("    {}: {} overrides were ignored", p.name, p.num_warnings);
                }
            }
        }
        Err(e) => fail(e),
    }

    Ok(())
}

/// Log a fatal error and exit with its code.
fn fail(e: GenError) -> ! {
    error!("{}", e);
    process::exit(e.exit_code())
}
