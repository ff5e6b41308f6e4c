use clap::{Parser, Subcommand};
use goedel::flaci::Flaci;
use goedel::loader::AutomatonLoader;
use goedel::machine::{execute_for, run, Configuration};
use goedel::{
    export, parse, Base, Direction, GoedelError, ProgramManager, TuringMachineDefinition,
    MAX_EXECUTION_STEPS,
};
use log::{debug, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Log what the library is doing
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a Gödel number and run the machine
    Run {
        /// The Gödel number, including the initial tape
        #[clap(required_unless_present = "program")]
        number: Option<String>,

        /// Run a built-in machine instead
        #[clap(short, long, conflicts_with = "number")]
        program: Option<String>,

        /// The base the number is written in: 2, 10, or 16
        #[clap(short, long, default_value_t = 2)]
        base: u32,

        /// Stop after this many steps
        #[clap(short, long, default_value_t = MAX_EXECUTION_STEPS)]
        max_steps: usize,

        /// Print each step of the execution
        #[clap(short = 'd', long)]
        debug: bool,
    },
    /// Decode a Gödel number and print its transition table
    Decode {
        number: String,

        /// The base the number is written in: 2, 10, or 16
        #[clap(short, long, default_value_t = 2)]
        base: u32,

        /// Print the machine as a FLACI document instead
        #[clap(long)]
        json: bool,
    },
    /// Compute the Gödel number of a FLACI Turing machine file
    Export { file: PathBuf },
    /// List the built-in machines
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command) -> Result<ExitCode, GoedelError> {
    match command {
        Command::Run {
            number,
            program,
            base,
            max_steps,
            debug,
        } => {
            let definition = match (program, number) {
                (Some(name), _) => ProgramManager::get_program_by_name(&name)?.definition,
                (None, Some(number)) => Arc::new(parse(number.trim(), Base::try_from(base)?)?),
                (None, None) => return Err(GoedelError::EmptyInput),
            };
            Ok(run_machine(definition, max_steps, debug))
        }
        Command::Decode { number, base, json } => {
            let definition = parse(number.trim(), Base::try_from(base)?)?;
            if json {
                println!("{}", Flaci::from_definition(&definition).to_json()?);
            } else {
                print_definition(&definition);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Export { file } => {
            let automaton = AutomatonLoader::load_automaton(&file)?;
            let number = export(&automaton)?;

            for base in [Base::Binary, Base::Decimal, Base::Hexadecimal] {
                println!("{:>2}: {}", base.radix(), number.to_string_radix(base));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            for index in 0..ProgramManager::get_program_count() {
                let info = ProgramManager::get_program_info(index)?;
                println!(
                    "{}: {} ({} states, {} transitions, tape {})",
                    info.index,
                    info.name,
                    info.state_count,
                    info.transition_count,
                    info.initial_tape
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Runs `definition` and reports the outcome. Exits with 2 on rejection and 3 when the step
/// budget runs out.
fn run_machine(definition: Arc<TuringMachineDefinition>, max_steps: usize, debug: bool) -> ExitCode {
    debug!("running for at most {max_steps} steps");

    let last = if debug {
        let mut last: Option<Configuration> = None;
        for configuration in execute_for(definition, max_steps) {
            println!("{configuration}");
            last = Some(configuration);
        }
        match last {
            Some(configuration) => configuration,
            None => return ExitCode::FAILURE,
        }
    } else {
        run(definition, max_steps)
    };

    println!("\nFinal configuration:\n{last}");

    if !last.is_finished() {
        println!("Stopped after {} steps.", last.steps());
        ExitCode::from(3)
    } else if last.is_accepted() {
        println!("Accepted after {} steps.", last.steps());
        ExitCode::SUCCESS
    } else {
        println!("Rejected after {} steps.", last.steps());
        ExitCode::from(2)
    }
}

fn print_definition(definition: &TuringMachineDefinition) {
    let label = |symbol| definition.label(symbol).unwrap_or("?");
    let direction = |d| match d {
        Direction::Left => "L",
        Direction::Right => "R",
    };

    println!(
        "States: {}",
        definition
            .states
            .iter()
            .map(|s| format!("q{s}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Alphabet: {}", definition.alphabet.join(", "));
    println!("Transitions:");
    for t in &definition.transitions {
        println!(
            "  q{}, {} -> q{}, {}, {}",
            t.from,
            label(t.read),
            t.to,
            label(t.write),
            direction(t.direction)
        );
    }
    println!("Initial tape: {}", definition.initial_tape_labels().concat());
}
