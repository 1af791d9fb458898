use clap::{Parser as ClapParser, Subcommand};
use classad::cli::{self, CheckOptions, CliError, EvalOptions};
use classad::{ClassAdReader, output::ExprPrinter};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "classad")]
#[command(about = "ClassAd - parse, evaluate and match ClassAd records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression or record and print its canonical form
    Check {
        /// The text to check (reads from stdin if not provided)
        text: Option<String>,

        /// Require a whole [...] record
        #[arg(long)]
        classad: bool,
    },

    /// Evaluate an expression
    Eval {
        /// The expression to evaluate
        expr: String,

        /// Record bound as MY
        #[arg(long)]
        my: Option<String>,

        /// Record bound as TARGET
        #[arg(long)]
        target: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Match two records through their Requirements and Rank
    Match {
        /// Left record
        left: String,
        /// Right record
        right: String,
    },

    /// Read a stream of [...] records from stdin and print each one
    Read {
        /// Pretty-print the records
        #[arg(short, long)]
        pretty: bool,
    },

    /// Convert old-format records on stdin to bracketed records
    Convert,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classad=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { text, classad } => run_check(text, classad),
        Commands::Eval {
            expr,
            my,
            target,
            json,
        } => run_eval(EvalOptions { expr, my, target }, json),
        Commands::Match { left, right } => run_match(&left, &right),
        Commands::Read { pretty } => run_read(pretty),
        Commands::Convert => read_stdin()
            .and_then(|text| cli::execute_convert(&text))
            .map(|converted| print!("{}", converted)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_stdin() -> Result<String, CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Err(CliError::NoInput);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
    Ok(buffer)
}

fn run_check(text: Option<String>, classad: bool) -> Result<(), CliError> {
    let text = match text {
        Some(text) => text,
        None => read_stdin()?,
    };
    let result = cli::execute_check(&CheckOptions { text, classad })?;
    println!("{}", result.canonical());
    Ok(())
}

fn run_eval(options: EvalOptions, json: bool) -> Result<(), CliError> {
    let value = cli::execute_eval(&options)?;
    if json {
        println!("{}", serde_json::to_string(&cli::value_to_json(&value))?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_match(left: &str, right: &str) -> Result<(), CliError> {
    let report = cli::execute_match(left, right)?;
    println!("left matches right: {}", report.left_matches_right);
    println!("right matches left: {}", report.right_matches_left);
    if let Some(rank) = report.left_rank {
        println!("left rank: {}", rank);
    }
    if let Some(rank) = report.right_rank {
        println!("right rank: {}", rank);
    }
    println!("{}", if report.matched() { "match" } else { "no match" });
    Ok(())
}

fn run_read(pretty: bool) -> Result<(), CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Err(CliError::NoInput);
    }
    let printer = ExprPrinter::new(pretty);
    for ad in ClassAdReader::new(io::stdin().lock()) {
        println!("{}", printer.print_classad(&ad?));
    }
    Ok(())
}
