use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use sbind_core::parser::tokenizer;
use sbind_core::{ProviderOptions, SecureBindingProvider, Value};
use std::path::PathBuf;
use std::process;

/// SBind — secure binding expression CLI
///
/// Tokenize, parse, check, and evaluate binding strings against JSON data.
#[derive(Parser)]
#[command(name = "sbind", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Provider options file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print nothing for successful checks
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a binding string
    Tokens {
        /// Binding string, e.g. 'text: user.name'
        binding: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the parsed AST as JSON
    Ast {
        /// Binding string
        binding: String,
    },

    /// Check that a binding string is well formed
    Check {
        /// Binding string
        binding: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every binding against a view model
    Eval {
        /// Binding string
        binding: String,
        /// View model as JSON, or @file
        #[arg(long)]
        data: Option<String>,
        /// Extra lookup context as JSON, or @file (consulted before --data)
        #[arg(long)]
        context: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up a dotted path in JSON data
    Pluck {
        /// Dotted path, e.g. 'a.b.1'
        path: String,
        /// Root object as JSON, or @file
        #[arg(long)]
        data: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

// ── Errors & exit codes ───────────────────────────────────

/// 1 = the binding string is invalid, 2 = bad input or options
enum CliError {
    Binding(sbind_core::Error),
    Input(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Binding(sbind_core::Error::Config(_)) => 2,
            CliError::Binding(_) => 1,
            CliError::Input(_) => 2,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CliError::Binding(err) => write!(f, "{}", err),
            CliError::Input(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<sbind_core::Error> for CliError {
    fn from(err: sbind_core::Error) -> Self {
        CliError::Binding(err)
    }
}

// ── Main ──────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, cli.no_color);

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            err.exit_code()
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(!no_color)
        .init();
}

fn run(cli: &Cli) -> Result<i32, CliError> {
    let options = load_options(cli.config.as_ref())?;
    tracing::debug!(?options, "provider options");
    let provider = SecureBindingProvider::with_options(options);

    match &cli.command {
        Commands::Tokens { binding, json } => cmd_tokens(binding, *json),
        Commands::Ast { binding } => cmd_ast(&provider, binding),
        Commands::Check { binding, json } => cmd_check(&provider, binding, *json, cli.quiet),
        Commands::Eval {
            binding,
            data,
            context,
            json,
        } => cmd_eval(&provider, binding, data.as_deref(), context.as_deref(), *json),
        Commands::Pluck { path, data, json } => cmd_pluck(&provider, path, data.as_deref(), *json),
        Commands::Version => {
            println!(
                "sbind {} (sbind-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(0)
        }
    }
}

fn load_options(path: Option<&PathBuf>) -> Result<ProviderOptions, CliError> {
    let Some(path) = path else {
        return Ok(ProviderOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(ProviderOptions::from_json(&text)?)
}

/// Inline JSON, or `@path` to read it from a file
fn load_json(arg: &str) -> Result<Value, CliError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("cannot read {}: {}", path, e)))?,
        None => arg.to_string(),
    };
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid JSON data: {}", e)))?;
    Ok(Value::from_json(&json))
}

fn to_pretty(json: &serde_json::Value) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}

// ── Commands ──────────────────────────────────────────────

fn cmd_tokens(binding: &str, json: bool) -> Result<i32, CliError> {
    let tokens = tokenizer::tokenize(binding).map_err(sbind_core::Error::from)?;

    if json {
        let value = serde_json::to_value(&tokens)
            .map_err(|e| CliError::Input(format!("cannot serialize tokens: {}", e)))?;
        println!("{}", to_pretty(&value));
    } else {
        for token in &tokens {
            println!(
                "{:>6}  {:<10}  {}",
                token.span.to_string().dimmed(),
                format!("{:?}", token.kind).cyan(),
                token.lexeme
            );
        }
    }
    Ok(0)
}

fn cmd_ast(provider: &SecureBindingProvider, binding: &str) -> Result<i32, CliError> {
    let bindings = provider.parse_ast(binding)?;
    let value = serde_json::to_value(&bindings)
        .map_err(|e| CliError::Input(format!("cannot serialize AST: {}", e)))?;
    println!("{}", to_pretty(&value));
    Ok(0)
}

fn cmd_check(
    provider: &SecureBindingProvider,
    binding: &str,
    json: bool,
    quiet: bool,
) -> Result<i32, CliError> {
    let result = provider.parse_ast(binding);

    if json {
        let report = match &result {
            Ok(bindings) => serde_json::json!({
                "valid": true,
                "bindings": bindings.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            }),
            Err(err) => serde_json::json!({
                "valid": false,
                "error": err.to_string(),
            }),
        };
        println!("{}", to_pretty(&report));
        return Ok(if result.is_ok() { 0 } else { 1 });
    }

    let bindings = result?;
    if !quiet {
        println!(
            "{} {} binding(s): {}",
            "valid".green().bold(),
            bindings.len(),
            bindings
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(0)
}

fn cmd_eval(
    provider: &SecureBindingProvider,
    binding: &str,
    data: Option<&str>,
    context: Option<&str>,
    json: bool,
) -> Result<i32, CliError> {
    let view_model = match data {
        Some(arg) => load_json(arg)?,
        None => Value::empty_object(),
    };
    let context = context.map(load_json).transpose()?;

    let bindings = provider.get_bindings(binding, &view_model, context.as_ref())?;
    let results = bindings.evaluate();

    if json {
        let mut values = serde_json::Map::new();
        let mut absent = Vec::new();
        for (name, value) in &results {
            match value {
                Some(v) => {
                    values.insert(name.clone(), v.to_json());
                }
                None => absent.push(name.clone()),
            }
        }
        let report = serde_json::json!({ "values": values, "absent": absent });
        println!("{}", to_pretty(&report));
    } else {
        for (name, value) in &results {
            match value {
                Some(v) => println!("{} = {}", name.bold(), v),
                None => println!("{} = {}", name.bold(), "<absent>".dimmed()),
            }
        }
    }
    Ok(0)
}

fn cmd_pluck(
    provider: &SecureBindingProvider,
    path: &str,
    data: Option<&str>,
    json: bool,
) -> Result<i32, CliError> {
    let root = match data {
        Some(arg) => load_json(arg)?,
        None => Value::empty_object(),
    };
    let value = provider.make_accessor(path, &root).get();

    if json {
        let report = serde_json::json!({
            "path": path,
            "absent": value.is_none(),
            "value": value.as_ref().map(Value::to_json),
        });
        println!("{}", to_pretty(&report));
    } else {
        match value {
            Some(v) => println!("{}", v),
            None => println!("{}", "<absent>".dimmed()),
        }
    }
    Ok(0)
}
