use std::{fmt, path::PathBuf};

use clap::{
    builder::PossibleValuesParser, command, value_parser, Arg, ArgAction, ArgMatches, Command,
};
use miette::Result;
use time::UtcOffset;

pub use crate::{
    app_config::{CredentialSet, Credentials},
    controller::{Controller, ReportOptions},
    manager::{add_credentials, Instance, Manager},
    tickets::{Project, Ticket},
    trackers::Tracker,
};

mod app_config;
mod controller;
mod fs;
mod manager;
mod prompt;
pub mod report;
mod tickets;
mod trackers;

/// The entrypoint for the `ticket-report` binary.
///
/// `utc_offset` is the local offset, used to timestamp the report. It has to be read before any
/// other thread exists, so the caller does that.
///
/// ## Errors
/// Anything which stops the report from being written, or credentials from being saved.
pub async fn run(utc_offset: UtcOffset) -> Result<()> {
    let matches = build_cli().get_matches();
    let config_root = app_config::config_root(matches.get_one::<PathBuf>(CONFIG_DIR).cloned())?;
    let controller = Controller::new(config_root);

    let mode = match matches.subcommand() {
        Some((RUN, sub_matches)) => Mode::Run(report_options(sub_matches)),
        Some((CONFIGURE, sub_matches)) => Mode::Configure(
            sub_matches
                .get_one::<String>(TRACKER)
                .map(|name| name.parse::<Tracker>())
                .transpose()?,
        ),
        _ => prompt::select(
            vec![Mode::Configure(None), Mode::Run(ReportOptions::default())],
            "Do you want to configure or run projects report creation?",
        )?,
    };

    match mode {
        Mode::Configure(only) => controller.configure(only).await?,
        Mode::Run(options) => {
            controller
                .run(&ReportOptions {
                    utc_offset,
                    ..options
                })
                .await?;
        }
    }
    Ok(())
}

const CONFIG_DIR: &str = "config-dir";
const RUN: &str = "run";
const CONFIGURE: &str = "configure";
const TRACKER: &str = "tracker";
const OUTPUT_DIR: &str = "output-dir";
const TEMPLATE_DIR: &str = "template-dir";
const NO_OPEN: &str = "no-open";

fn build_cli() -> Command {
    command!()
        .arg(
            Arg::new(CONFIG_DIR)
                .long(CONFIG_DIR)
                .env("TICKET_REPORT_CONFIG_DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Directory holding the credential sets of every tracker"),
        )
        .subcommand(
            Command::new(RUN)
                .about("Fetch every configured tracker and write the HTML report")
                .arg(
                    Arg::new(OUTPUT_DIR)
                        .long(OUTPUT_DIR)
                        .value_parser(value_parser!(PathBuf))
                        .default_value(".")
                        .help("Where to write the report"),
                )
                .arg(
                    Arg::new(TEMPLATE_DIR)
                        .long(TEMPLATE_DIR)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory containing head.html and/or tail.html to use instead of the built-in templates"),
                )
                .arg(
                    Arg::new(NO_OPEN)
                        .long(NO_OPEN)
                        .action(ArgAction::SetTrue)
                        .help("Don't open the report in a browser once it's written"),
                ),
        )
        .subcommand(
            Command::new(CONFIGURE)
                .about("Add a tracker account, checking the credentials before saving them")
                .arg(
                    Arg::new(TRACKER)
                        .long(TRACKER)
                        .value_parser(PossibleValuesParser::new(
                            Tracker::ALL.map(Tracker::name),
                        ))
                        .help("Only configure this tracker"),
                ),
        )
}

fn report_options(matches: &ArgMatches) -> ReportOptions {
    ReportOptions {
        output_dir: matches
            .get_one::<PathBuf>(OUTPUT_DIR)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        template_dir: matches.get_one::<PathBuf>(TEMPLATE_DIR).cloned(),
        open: !matches.get_flag(NO_OPEN),
        ..ReportOptions::default()
    }
}

enum Mode {
    Configure(Option<Tracker>),
    Run(ReportOptions),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Configure(_) => f.write_str("configure"),
            Mode::Run(_) => f.write_str("run"),
        }
    }
}
