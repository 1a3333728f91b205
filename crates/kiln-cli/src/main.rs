mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_PLAN_ERROR, EXIT_REQUEST_ERROR};
use kiln_recipe::Descriptor;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "kiln",
    version,
    about = "Build-recipe descriptor engine for the TVM machine-learning compiler framework"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the built-in recipe: versions, variants, dependencies, conflicts.
    Info,
    /// Resolve variant state for a request (defaults plus overrides).
    Resolve {
        /// Spec tokens: +variant, ~variant, variant=value, @version.
        spec: Vec<String>,
        /// Path to a TOML request file.
        #[arg(long)]
        request: Option<PathBuf>,
        /// Target platform (linux, darwin, windows); defaults to the host.
        #[arg(long)]
        platform: Option<String>,
    },
    /// Print the ordered configure defines for a request.
    Flags {
        /// Spec tokens: +variant, ~variant, variant=value, @version.
        spec: Vec<String>,
        /// Path to a TOML request file.
        #[arg(long)]
        request: Option<PathBuf>,
        /// Target platform (linux, darwin, windows); defaults to the host.
        #[arg(long)]
        platform: Option<String>,
        /// Install prefix of a resolved dependency, as pkg=path. Repeatable.
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
    },
    /// Concretize a request into a build plan file.
    Plan {
        /// Spec tokens: +variant, ~variant, variant=value, @version.
        spec: Vec<String>,
        /// Path to a TOML request file.
        #[arg(long)]
        request: Option<PathBuf>,
        /// Target platform (linux, darwin, windows); defaults to the host.
        #[arg(long)]
        platform: Option<String>,
        /// Install prefix of a resolved dependency, as pkg=path. Repeatable.
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
        /// Output path for the plan file.
        #[arg(long, default_value = "kiln.lock")]
        out: PathBuf,
    },
    /// Verify a plan file's identity hash.
    Verify {
        /// Path to the plan file.
        #[arg(long, default_value = "kiln.lock")]
        plan: PathBuf,
    },
    /// Copy the language bindings into the platform library path.
    PostInstall {
        /// Root of the built source tree.
        #[arg(long)]
        source: PathBuf,
        /// Destination platform library directory.
        #[arg(long)]
        platlib: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KILN_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let descriptor = Descriptor::tvm();
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Info => commands::info::run(descriptor, json_output),
        Commands::Resolve {
            spec,
            request,
            platform,
        } => commands::resolve::run(
            descriptor,
            &spec,
            request.as_deref(),
            platform.as_deref(),
            json_output,
        ),
        Commands::Flags {
            spec,
            request,
            platform,
            prefixes,
        } => commands::flags::run(
            descriptor,
            &spec,
            request.as_deref(),
            platform.as_deref(),
            &prefixes,
            json_output,
        ),
        Commands::Plan {
            spec,
            request,
            platform,
            prefixes,
            out,
        } => commands::plan::run(
            descriptor,
            &spec,
            request.as_deref(),
            platform.as_deref(),
            &prefixes,
            &out,
            json_output,
        ),
        Commands::Verify { plan } => commands::verify::run(&plan, json_output),
        Commands::PostInstall { source, platlib } => {
            commands::post_install::run(descriptor, &source, &platlib, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("request error:")
                || msg.starts_with("unknown variant")
                || msg.starts_with("variant ")
            {
                EXIT_REQUEST_ERROR
            } else if msg.starts_with("plan error:") {
                EXIT_PLAN_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
