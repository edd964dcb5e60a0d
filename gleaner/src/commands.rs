use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_OUTPUT_DIR: &str = "./gleaner-output";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("gleaner")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("gleaner")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and progress output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .required(false)
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Breadth-first crawl from one or more seed URLs, keeping the text of pages \
                that mention any keyword.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Seed URL (repeatable)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory for page<N>.txt files, index.csv and summary.json")
                        .default_value(DEFAULT_OUTPUT_DIR),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON file with crawl settings; flags override it")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-k --"keyword" <KEYWORD>)
                        .required(false)
                        .help("Relevance keyword (repeatable, replaces the configured set)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"max-depth" <N>)
                        .required(false)
                        .help("Deepest link distance from a seed to follow")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-pages" <N>)
                        .required(false)
                        .help("Stop after this many pages are accepted")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-links" <N>)
                        .required(false)
                        .help("Most new links taken from a single accepted page")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--"delay" <SECS>)
                        .required(false)
                        .help("Minimum seconds between outbound requests")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--"deadline" <SECS>)
                        .required(false)
                        .help("Stop the whole crawl after this many seconds")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("verify")
                .about("Check that an output directory reads back as a consistent corpus")
                .arg(
                    arg!(<DIR>)
                        .required(true)
                        .help("Output directory of a previous crawl"),
                ),
        )
}
