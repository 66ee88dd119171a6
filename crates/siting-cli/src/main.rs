mod report;

use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use report::Format;
use siting_model::{CompileOptions, CompiledModel, FacilityInstance};
use siting_solver::Solver;

#[derive(Parser)]
#[command(name = "siting")]
#[command(about = "Solve the four-site facility siting MILP", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Solve options, accepted without the `solve` subcommand
    #[command(flatten)]
    solve: SolveArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the instance and print the optimum (the default)
    Solve(SolveArgs),
    /// Print the compiled formulation without solving
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Force a facility open (0-based index, repeatable)
        #[arg(long = "open", value_name = "IDX")]
        open: Vec<usize>,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Force a facility open (0-based index, repeatable)
    #[arg(long = "open", value_name = "IDX")]
    open: Vec<usize>,
    /// Audit the solution against every constraint and variable domain
    #[arg(long)]
    check: bool,
    /// Tolerance used by the audit
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Solve(args)) => solve(args),
        None => solve(cli.solve),
        Some(Commands::Show { format, open }) => {
            let compiled = compile(&open);
            match format {
                Format::Text => print!("{}", report::formulation_text(&compiled.problem)),
                Format::Json => match serde_json::to_string_pretty(&compiled.problem) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        std::process::exit(1);
                    }
                },
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn compile(open: &[usize]) -> CompiledModel {
    let options = open
        .iter()
        .fold(CompileOptions::default(), |options, &f| options.force_open(f));

    match FacilityInstance::standard().compile(&options) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve(args: SolveArgs) {
    let compiled = compile(&args.open);
    debug!("forced open: {:?}", args.open);

    let solver = Solver::new().with_tolerance(args.tolerance);
    let solution = solver.solve(&compiled.problem);

    let check = args.check.then_some(solver.tolerance());
    match report::solve_report(&compiled, &solution, args.format, check) {
        Ok(out) => println!("{}", out),
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }

    info!(
        "open facilities: {}",
        compiled.open_facilities(&solution.values).join(", ")
    );

    if args.check && !solution.is_verified() {
        std::process::exit(1);
    }
}
