use colored::Colorize;
use gleaner::commands::command_argument_builder;
use gleaner::handlers::{handle_crawl, handle_verify, init_logging, report_owns_stdout};
use gleaner::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_logging(chosen_command.get_count("verbose"));

    // Show banner unless --quiet is set or stdout carries a JSON report
    if !quiet && !report_owns_stdout(&chosen_command) {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("verify", primary_command)) => handle_verify(primary_command, quiet),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
