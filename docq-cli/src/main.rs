// Command-line interface for docq
//
// docq reads structured text in one format and writes it in another. All the format work lives
// in docq-babel; this binary picks the formats, loads configuration and moves bytes between
// files, stdin and stdout.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension,
// while being overwrittable by an explicit --from flag. The to falls back to output.format from
// the configuration.
// Usage:
//  docq <input> --to <format> [--from <format>] [--output <file>]
//      Convert between formats (default)
//  docq convert <input> --to <format> [--from <format>] [--output <file>]
//      Same as above (explicit)
//  docq inspect <input> [--from <format>]    - Print the decoded node tree
//  docq --list-formats                       - List available formats
//
// Configuration:
//
// Defaults come from docq-config, then ./docq.toml, then --config <path>, then --set key=value
// and the dedicated flags (--indent, --color).
//
// Logging goes to stderr and is controlled by DOCQ_LOG (an EnvFilter directive, default "warn").

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use docq_babel::{DecoderPreferences, FormatError, FormatRegistry};
use docq_config::{DocqConfig, Loader};
use std::fs;
use std::io::{self, Read, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pseudo path naming standard input.
const STDIN: &str = "-";

/// Subcommand names; anything else in first position is an input for `convert`.
const SUBCOMMANDS: &[&str] = &["convert", "inspect", "help"];

fn build_cli() -> Command {
    Command::new("docq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert structured documents between YAML, JSON, XML, CSV and friends")
        .long_about(
            "docq decodes a document in one format and encodes it in another.\n\n\
            Commands:\n  \
            - convert: Transform between formats (default command)\n  \
            - inspect: Print the decoded node tree\n\n\
            Examples:\n  \
            docq config.yaml --to json              # YAML to JSON on stdout\n  \
            docq data.csv --to yaml -o data.yaml    # CSV rows to a YAML file\n  \
            cat app.properties | docq - --from props --to yaml\n  \
            docq inspect pom.xml                    # See how XML maps onto the tree",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docq.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a configuration key, e.g. --set csv.separator=';'")
                .action(ArgAction::Append)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats (default command)")
                .long_about(
                    "Convert every document of the input to the target format.\n\n\
                    The source format is auto-detected from the file extension; standard\n\
                    input (-) is read as YAML unless --from says otherwise.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    docq convert input.yaml --to json         # JSON on stdout\n  \
                    docq convert input.json --to xml -o a.xml # XML file\n  \
                    docq input.yaml --to json --indent 0      # 'convert' is optional",
                )
                .arg(input_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (defaults to output.format from configuration)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .short('I')
                        .help("Spaces per nesting level; 0 selects the compact layout")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("color")
                        .long("color")
                        .short('C')
                        .help("Colorize YAML and JSON output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the decoded node tree of a document")
                .arg(input_arg())
                .arg(from_arg()),
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file path, or - for standard input")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format (auto-detected from file extension if not specified)")
        .value_hint(ValueHint::Other)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DOCQ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    init_tracing();

    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if args.len() > 1
                && (!args[1].starts_with('-') || args[1] == STDIN)
                && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let registry = FormatRegistry::with_defaults();

    if matches.get_flag("list-formats") {
        print!("{}", list_formats(&registry));
        return;
    }

    let config = load_cli_config(&matches);
    let result = match matches.subcommand() {
        Some(("convert", sub_matches)) => handle_convert_command(&registry, &config, sub_matches),
        Some(("inspect", sub_matches)) => handle_inspect_command(&registry, &config, sub_matches),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn load_cli_config(matches: &ArgMatches) -> DocqConfig {
    let loader = Loader::new().with_local_file(".");
    let loader = match matches.get_one::<String>("config") {
        Some(path) => loader.with_file(path),
        None => loader,
    };
    let mut loader = apply_overrides(loader, matches).unwrap_or_else(|err| {
        eprintln!("Invalid configuration override: {err}");
        std::process::exit(1);
    });

    if let Some(("convert", sub_matches)) = matches.subcommand() {
        if let Some(indent) = sub_matches.get_one::<u16>("indent") {
            loader = loader
                .set_override("output.indent", i64::from(*indent))
                .unwrap_or_else(|err| {
                    eprintln!("Invalid --indent: {err}");
                    std::process::exit(1);
                });
        }
        if sub_matches.get_flag("color") {
            loader = loader
                .set_override("output.colorize", true)
                .unwrap_or_else(|err| {
                    eprintln!("Invalid --color: {err}");
                    std::process::exit(1);
                });
        }
    }

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Layer every `--set key=value` onto the loader, in command-line order.
fn apply_overrides(mut loader: Loader, matches: &ArgMatches) -> Result<Loader, String> {
    let Some(values) = matches.get_many::<String>("set") else {
        return Ok(loader);
    };
    for raw in values {
        let (key, value) = parse_override(raw)?;
        loader = loader
            .set_override(key, value.to_string())
            .map_err(|err| err.to_string())?;
    }
    Ok(loader)
}

fn parse_override(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim(), strip_quotes(value.trim())))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Pick the source format: explicit flag, file extension, or YAML for stdin.
fn resolve_from(
    registry: &FormatRegistry,
    input: &str,
    explicit: Option<&String>,
) -> Result<String, String> {
    if let Some(format) = explicit {
        return Ok(format.to_string());
    }
    if input == STDIN {
        return Ok("yaml".to_string());
    }
    registry.detect_format_from_filename(input).ok_or_else(|| {
        format!("Could not detect format from filename '{input}'. Please specify --from explicitly")
    })
}

fn read_input(input: &str) -> Result<String, String> {
    if input == STDIN {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| format!("reading standard input: {e}"))?;
        return Ok(source);
    }
    fs::read_to_string(input).map_err(|e| format!("reading file '{input}': {e}"))
}

/// Decode every document of `source` and re-encode the stream in the target format.
fn convert(
    registry: &FormatRegistry,
    config: &DocqConfig,
    source: &str,
    from: &DecoderPreferences,
    to: Option<&str>,
) -> Result<String, FormatError> {
    let prefs = config.preferences();
    let encoder = config.encoder_preferences(to);
    tracing::info!(from = %from.format, to = %encoder.format, "converting");
    let documents = registry.decode_all(source, &from.format, &prefs)?;
    let mut output = registry.encode_all(&documents, &encoder, &prefs)?;
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    config: &DocqConfig,
    matches: &ArgMatches,
) -> Result<(), String> {
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or(STDIN);
    let from = resolve_from(registry, input, matches.get_one::<String>("from"))?;
    let to = matches.get_one::<String>("to").map(String::as_str);

    // Validate formats before touching the input
    registry.get(&from).map_err(|e| e.to_string())?;
    if let Some(to) = to {
        registry.get(to).map_err(|e| e.to_string())?;
    }

    let source = read_input(input)?;
    let output = convert(registry, config, &source, &DecoderPreferences::new(from), to)
        .map_err(|e| e.to_string())?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            fs::write(path, output).map_err(|e| format!("writing file '{path}': {e}"))?;
        }
        None => {
            io::stdout()
                .write_all(output.as_bytes())
                .map_err(|e| format!("writing output: {e}"))?;
        }
    }
    Ok(())
}

/// Handle the inspect command
fn handle_inspect_command(
    registry: &FormatRegistry,
    config: &DocqConfig,
    matches: &ArgMatches,
) -> Result<(), String> {
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or(STDIN);
    let from = resolve_from(registry, input, matches.get_one::<String>("from"))?;
    let source = read_input(input)?;
    print!("{}", inspect(registry, config, &source, &from).map_err(|e| e.to_string())?);
    Ok(())
}

fn inspect(
    registry: &FormatRegistry,
    config: &DocqConfig,
    source: &str,
    from: &str,
) -> Result<String, FormatError> {
    let documents = registry.decode_all(source, from, &config.preferences())?;
    Ok(documents
        .iter()
        .map(|document| document.tree.dump(document.root))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// One line per format: name, aliases, supported directions and description.
fn list_formats(registry: &FormatRegistry) -> String {
    let mut output = String::from("Available formats:\n\n");
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let directions = match (format.supports_decoding(), format.supports_encoding()) {
            (true, true) => "decode/encode",
            (true, false) => "decode",
            (false, true) => "encode",
            (false, false) => "-",
        };
        let aliases = if format.aliases().is_empty() {
            String::new()
        } else {
            format!(" ({})", format.aliases().join(", "))
        };
        output.push_str(&format!(
            "  {:<24} {:<14} {}\n",
            format!("{name}{aliases}"),
            directions,
            format.description()
        ));
    }
    output
}
