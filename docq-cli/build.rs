use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the default registry in docq-babel
// Build scripts can't see the library, so keep this list in step with FormatRegistry::with_defaults
const AVAILABLE_FORMATS: &[&str] = &[
    "yaml",
    "json",
    "xml",
    "csv",
    "tsv",
    "properties",
    "base64",
    "uri",
    "sh",
];

fn format_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS))
        .value_hint(ValueHint::Other)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file path, or - for standard input")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("docq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert structured documents between YAML, JSON, XML, CSV and friends")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a docq.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats")
                .arg(input_arg())
                .arg(format_arg("from", "Source format"))
                .arg(format_arg("to", "Target format"))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .short('I')
                        .help("Spaces per nesting level"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the decoded node tree of a document")
                .arg(input_arg())
                .arg(format_arg("from", "Source format")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "docq", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "docq", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "docq", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
