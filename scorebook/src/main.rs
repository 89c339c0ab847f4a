use clap::Parser;
use hoops_common::league_api::{Credential, LeagueApiClient};
use inquire::{Password, PasswordDisplayMode};
use log::*;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::PathBuf;

mod console;
mod scoring_session;
use scoring_session::MatchScoringSession;

mod config;
use config::Config;

const APP_NAME: &str = "scorebook";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short)]
    /// Id of the fixture to score
    fixture: u32,

    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long, short)]
    /// Read the config from this file instead of the default location
    config: Option<PathBuf>,

    #[clap(long)]
    /// Access token for the league server, overrides the config file
    token: Option<String>,

    #[clap(long)]
    /// Don't require HTTPS to connect to the league server
    allow_http: bool,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match args.log_location {
        Some(path) => path,
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("scorebook-logs");
            path
        }
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path.clone();
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(not(target_os = "windows"))]
    let console_target = Target::Stderr;
    #[cfg(target_os = "windows")]
    let console_target = Target::Stdout; // Windows apps don't get a stderr handle
    let console = ConsoleAppender::builder()
        .target(console_target)
        .encoder(Box::new(PatternEncoder::new("[{d(%H:%M:%S)} {h({l:5})}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        &archived_log_path.to_string_lossy(),
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(&log_path, Box::new(file_policy))?;

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder()
        .appender("file_appender")
        .appender("console")
        .build(LevelFilter::Error);

    // Setup the top level logging config
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)))
        .appender(Appender::builder().build("console", Box::new(console)))
        .logger(Logger::builder().build(APP_NAME, log_level)) // Setup the logging from this app to use `log_level`
        .logger(Logger::builder().build("hoops_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    debug!("Log path: {}", log_path.display());

    let config: Config = match args.config {
        Some(ref path) => {
            info!("Reading config file from {path:?}");
            Config::new_from_file(path)?
        }
        None => {
            info!(
                "Reading config file from {:?}",
                confy::get_configuration_file_path(APP_NAME, None)?
            );
            match confy::load(APP_NAME, None) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Failed to read config file, overwriting with default. Error: {e}");
                    let config = Config::default();
                    confy::store(APP_NAME, None, &config)?;
                    config
                }
            }
        }
    };

    let credential = match args.token.as_deref().or(config.league.access_token()) {
        Some(token) => Credential::new(token),
        None => {
            let token = Password::new("League access token:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()?;
            Credential::new(&token)
        }
    };

    let client = LeagueApiClient::new(
        &config.league.url,
        config.league.require_https && !args.allow_http,
        config.league.timeout(),
    )?;

    info!("Loading fixture {} from {}", args.fixture, client.base_url());
    let identity = client.get_fixture(args.fixture, &credential).await?;
    let session = MatchScoringSession::new(identity);

    console::run(session, &client, &credential, &config).await?;

    Ok(())
}
