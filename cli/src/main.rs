use std::{io::Write, process::ExitCode, time::Duration};

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use log::error;
use perft_driver::{DriverConfig, EngineCommandLine, ErrorKind, SessionErr};
use perft_protocol::{CommandRequest, ExtractErr, LineEnding, SentinelScan};

/// Bad command line. clap's own code (2) is taken by timeouts.
const USAGE_EXIT_CODE: u8 = 64;

fn main() -> ExitCode {
    // Engine settings may live in a .env file next to the perftree setup.
    dotenvy::dotenv().ok();
    env_logger::init();

    let matches = match create_command().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            err.print().ok();
            if err.use_stderr() {
                return ExitCode::from(USAGE_EXIT_CODE);
            } else {
                return ExitCode::SUCCESS;
            }
        }
    };

    let request = command_request(&matches);
    let config = driver_config(&matches);
    let scan = config.sentinel_scan();

    let result = match perft_driver::run_perft(&request, config) {
        Ok(result) => result,
        Err(err) => {
            error!("{err}");
            if let SessionErr::Extract { err, captured } = &err {
                emit_extract_diagnostic(&scan, err, captured);
            }
            return ExitCode::from(err.kind().exit_code());
        }
    };

    let report = perft_driver::divide_report(&result);
    let output = if matches.get_flag("total only") {
        match report {
            Some(report) => report.total.to_string(),
            None => {
                error!("The engine's result has no node total: {result:?}");
                return ExitCode::from(ErrorKind::SentinelNotFound.exit_code());
            }
        }
    } else {
        result
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{output}").and_then(|_| stdout.flush()) {
        error!("Failed to write the result. Inner error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn create_command() -> Command {
    command!()
        .about("Runs one perft query against an engine that echoes its input")
        .arg(
            Arg::new("depth")
                .required(true)
                .value_parser(value_parser!(u32))
                .help("the perft search depth"),
        )
        .arg(
            Arg::new("fen")
                .required(true)
                .help("the position, in Forsyth-Edwards notation"),
        )
        .arg(
            Arg::new("moves")
                .num_args(1..)
                .help("moves to play from the position before counting"),
        )
        .arg(
            Arg::new("engine")
                .long("engine")
                .env("PERFTREE_ENGINE")
                .value_name("PROGRAM")
                .required(true)
                .help("the engine executable"),
        )
        .arg(
            Arg::new("engine args")
                .long("engine-arg")
                .value_name("ARG")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .help("an argument passed to the engine; may be repeated"),
        )
        .arg(
            Arg::new("line ending")
                .long("line-ending")
                .env("PERFTREE_LINE_ENDING")
                .value_name("lf|crlf")
                .value_parser(str::parse::<LineEnding>)
                .default_value("crlf")
                .help("the line ending sent to the engine and expected after its echo of quit"),
        )
        .arg(
            Arg::new("sync timeout")
                .long("sync-timeout-ms")
                .env("PERFTREE_SYNC_TIMEOUT_MS")
                .value_name("MILLISECONDS")
                .value_parser(value_parser!(u64))
                .default_value("10000")
                .help("how long to wait for the engine to echo a command"),
        )
        .arg(
            Arg::new("capture timeout")
                .long("capture-timeout-ms")
                .env("PERFTREE_CAPTURE_TIMEOUT_MS")
                .value_name("MILLISECONDS")
                .value_parser(value_parser!(u64))
                .default_value("600000")
                .help("how long to wait for the engine to finish after quit"),
        )
        .arg(
            Arg::new("trailing bytes")
                .long("trailing-bytes")
                .env("PERFTREE_TRAILING_BYTES")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("control bytes at the end of the engine's output to drop"),
        )
        .arg(
            Arg::new("total only")
                .long("total-only")
                .action(ArgAction::SetTrue)
                .help("print only the total node count of a divide result"),
        )
}

fn command_request(matches: &ArgMatches) -> CommandRequest {
    let depth = *matches
        .get_one::<u32>("depth")
        .expect("'depth' is required");
    let fen = matches
        .get_one::<String>("fen")
        .expect("'fen' is required");
    let moves = matches
        .get_many::<String>("moves")
        .map(|moves| moves.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    CommandRequest::new(depth, fen.clone(), moves)
}

fn driver_config(matches: &ArgMatches) -> DriverConfig {
    let program = matches
        .get_one::<String>("engine")
        .expect("'engine' is required");
    let args = matches
        .get_many::<String>("engine args")
        .map(|args| args.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    let mut config = DriverConfig::new(EngineCommandLine::new(program.clone()).with_args(args));
    if let Some(line_ending) = matches.get_one::<LineEnding>("line ending") {
        config.line_ending = *line_ending;
    }
    if let Some(millis) = matches.get_one::<u64>("sync timeout") {
        config.sync_timeout = Duration::from_millis(*millis);
    }
    if let Some(millis) = matches.get_one::<u64>("capture timeout") {
        config.capture_timeout = Duration::from_millis(*millis);
    }
    if let Some(count) = matches.get_one::<usize>("trailing bytes") {
        config.trailing_bytes = *count;
    }

    config
}

/// Points at the place in the engine's output where the result could
/// not be found.
fn emit_extract_diagnostic(scan: &SentinelScan, err: &ExtractErr, captured: &[u8]) {
    let Ok(output) = std::str::from_utf8(captured) else {
        return;
    };
    let span = err.span(scan.sentinel().len(), output.len());
    if !output.is_char_boundary(span.start) || !output.is_char_boundary(span.end) {
        return;
    }

    let mut files = SimpleFiles::new();
    let file_id = files.add("engine output", output);

    let label = match err {
        ExtractErr::SentinelNotFound => "output ends without an echoed quit",
        ExtractErr::UnexpectedLineEnding { .. } => "expected the line ending after this",
        ExtractErr::MalformedSlice { .. } => "nothing left for a result here",
        ExtractErr::UnexpectedTrailingBytes { .. } => "expected control bytes here",
    };
    let diagnostic = Diagnostic::error()
        .with_message(err.to_string())
        .with_label(Label::primary(file_id, span).with_message(label));

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();
    term::emit(&mut writer.lock(), &config, &files, &diagnostic).ok();
}
