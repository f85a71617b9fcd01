use clap::{Arg, Command};
use env_logger::{Builder, Env};
use std::io::Write;

/// These options define the inputs from the user.
/// Nothing is owned by non-basic data types so the struct can be passed
/// around freely.
#[derive(Clone, Debug)]
pub struct CommandLineOptions {
    pub network_file: String,
    pub queries_file: String,
    pub output_file: String,
}

/// Initialize env_logger with a file:line format, defaulting to `info`.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .init();
}

pub fn parse_configuration_options() -> CommandLineOptions {
    init_logging();
    let matches = Command::new("BAYESNET")
        .version("1.0")
        .about("Exact inference and d-separation queries over discrete Bayesian networks.")
        .arg(
            Arg::new("network")
                .long("network")
                .value_name("FILE")
                .help("Path to the JSON network definition file")
                .required(true),
        )
        .arg(
            Arg::new("queries")
                .long("queries")
                .value_name("FILE")
                .help("Path to the query file, one query per line")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("Path of the result file to write")
                .default_value("output.txt"),
        )
        .get_matches();

    let network_file = matches
        .get_one::<String>("network")
        .expect("network is required") // As it's required, unwrap directly
        .to_string();
    let queries_file = matches
        .get_one::<String>("queries")
        .expect("queries is required")
        .to_string();
    let output_file = matches
        .get_one::<String>("output")
        .expect("output has a default value")
        .to_string();

    CommandLineOptions {
        network_file,
        queries_file,
        output_file,
    }
}
