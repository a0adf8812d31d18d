use clap::{Parser as ClapParser, Subcommand};
use formula_lang::{
    cli::{self, CheckOptions, CheckResult, CliError},
    parser,
};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(about = "Formula - compile and evaluate expressions against JSON bindings")]
#[command(version)]
struct Cli {
    /// Log compilation and cache activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate a formula
    Check {
        /// The formula to evaluate
        expression: String,

        /// JSON object of bindings (reads from stdin if not provided)
        #[arg(short, long)]
        bindings: Option<String>,

        /// A single binding as name=JSON; may be repeated
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,

        /// Evaluate once per element of the array bindings
        #[arg(long)]
        iterate: bool,

        /// Match builtin function names regardless of case
        #[arg(long)]
        ignore_case: bool,

        /// Bypass the compiled expression cache
        #[arg(long)]
        no_cache: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the canonical form of a formula
    Format {
        /// The formula to format
        expression: String,
    },

    /// List the builtin functions
    Functions,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Check {
            expression,
            bindings,
            params,
            iterate,
            ignore_case,
            no_cache,
            syntax_only,
            pretty,
        } => run_check(
            CheckOptions {
                expression,
                bindings,
                params,
                iterate,
                ignore_case,
                no_cache,
                syntax_only,
            },
            pretty,
        ),
        Commands::Format { expression } => match parser::parse(&expression) {
            Ok(expr) => {
                println!("{}", expr);
                Ok(())
            }
            Err(e) => Err(CliError::Compile(e)),
        },
        Commands::Functions => {
            print!("{}", cli::functions_listing());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions, pretty: bool) -> Result<(), CliError> {
    if options.bindings.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.bindings = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
