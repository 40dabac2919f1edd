mod logging;
mod render;

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use mathiter_core::model::{
    ChoiceId, CurriculumSystem, Grade, ProblemChoices, ProblemId, UserContext, UserId,
};
use mathiter_core::{LegacyPhase, SessionEffect, SessionError, SessionPhase, TimerEvent};
use services::{
    AdaptiveTestController, ApiConfig, ClientError, Clock, HttpApiClient, LegacyTestController,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::info;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGrade { raw: String },
    InvalidSystem { raw: String },
    InvalidUserId { raw: String },
    InvalidDuration { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGrade { raw } => write!(f, "invalid --grade value: {raw}"),
            ArgsError::InvalidSystem { raw } => write!(f, "invalid --system value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- adaptive [options]");
    eprintln!("  cargo run -p app -- legacy   [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --api-url <url>       backend base url");
    eprintln!("  --grade <G7..G12>     default G9");
    eprintln!("  --system <US|UK|..>   default US");
    eprintln!("  --user-id <id>        default: a fresh guest id");
    eprintln!("  --duration <secs>     test length, default 1800");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATHITER_API_BASE_URL, MATHITER_REQUEST_TIMEOUT_SECS, MATHITER_TEST_DURATION_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Adaptive,
    Legacy,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "adaptive" => Some(Self::Adaptive),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    api_url: Option<String>,
    grade: Grade,
    system: CurriculumSystem,
    user_id: Option<UserId>,
    duration_secs: Option<u32>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            api_url: None,
            grade: Grade::G9,
            system: CurriculumSystem::Us,
            user_id: None,
            duration_secs: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => parsed.api_url = Some(require_value(args, "--api-url")?),
                "--grade" => {
                    let value = require_value(args, "--grade")?;
                    parsed.grade = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidGrade { raw: value.clone() })?;
                }
                "--system" => {
                    let value = require_value(args, "--system")?;
                    parsed.system = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSystem { raw: value.clone() })?;
                }
                "--user-id" => {
                    let value = require_value(args, "--user-id")?;
                    parsed.user_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?,
                    );
                }
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    let secs = value
                        .parse::<u32>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| ArgsError::InvalidDuration { raw: value.clone() })?;
                    parsed.duration_secs = Some(secs);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn context(&self) -> UserContext {
        match &self.user_id {
            Some(user_id) => UserContext::new(user_id.clone(), self.grade, self.system.clone()),
            None => UserContext::guest(self.grade, self.system.clone()),
        }
    }

    /// Environment first, then flags on top.
    fn api_config(&self) -> Result<ApiConfig, Box<dyn std::error::Error>> {
        let mut config = ApiConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url)?;
        }
        if let Some(secs) = self.duration_secs {
            config = config.with_test_duration(secs);
        }
        Ok(config)
    }
}

type InputLines = Lines<BufReader<Stdin>>;

fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Fires once per second, starting one second from now. Ticks missed while
/// an input line is being handled are dropped, never replayed in a burst.
fn ticker() -> Interval {
    let period = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn show(render: impl FnOnce(&mut io::StdoutLock<'_>) -> io::Result<()>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    render(&mut out)?;
    out.flush()
}

/// Print errors that the session views do not already show.
fn report_error(err: &ClientError) -> io::Result<()> {
    if err.is_network() {
        return Ok(());
    }
    show(|out| writeln!(out, "! {err}"))
}

async fn run_adaptive(
    client: Arc<HttpApiClient>,
    config: &ApiConfig,
    context: UserContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = AdaptiveTestController::new(client, config.timer_config());
    info!(base_url = %config.base_url(), "adaptive test");

    if let Err(err) = controller.start(context).await {
        show(|out| render::render_session(out, &controller.snapshot()))?;
        return Err(err.into());
    }
    show(|out| {
        render::render_session(out, &controller.snapshot())?;
        writeln!(out, "Type a letter to choose, Enter to submit, `= text` to answer freely, q to quit.")
    })?;

    let mut lines = stdin_lines();
    let mut ticker = ticker();
    let mut level = controller.snapshot().timer.level;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if matches!(input, "q" | "quit") {
                    break;
                }
                if let Err(err) = adaptive_input(&mut controller, input).await {
                    report_error(&err)?;
                }
                // Time spent awaiting the backend is not countdown time.
                ticker.reset();
                show(|out| render::render_session(out, &controller.snapshot()))?;
                if controller.session().phase() == SessionPhase::Finished {
                    break;
                }
            }
            _ = ticker.tick() => {
                let effects = controller.tick();
                if effects.contains(&SessionEffect::TimeExpired) {
                    show(|out| writeln!(out, "Time is up. You can still finish the test."))?;
                }
                let timer = controller.snapshot().timer;
                if timer.level != level {
                    level = timer.level;
                    show(|out| render::render_timer(out, &timer))?;
                }
            }
        }
    }
    Ok(())
}

async fn adaptive_input(controller: &mut AdaptiveTestController, input: &str) -> Result<(), ClientError> {
    if input.is_empty() {
        controller.submit(None).await?;
        return Ok(());
    }
    if let Some(text) = input.strip_prefix('=') {
        controller.submit(Some(text.to_owned())).await?;
        return Ok(());
    }

    let choice = render::choice_index(input).and_then(|index| {
        controller
            .session()
            .current_question()
            .and_then(|question| question.choice_at(index))
            .map(|choice| choice.id.clone())
    });
    let choice = choice.ok_or_else(|| SessionError::UnknownChoice(ChoiceId::new(input)))?;
    controller.select(choice).await?;
    Ok(())
}

async fn run_legacy(
    client: Arc<HttpApiClient>,
    config: &ApiConfig,
    context: UserContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller =
        LegacyTestController::new(client, Clock::default(), context, config.timer_config());
    info!(base_url = %config.base_url(), "legacy test");

    if let Err(err) = controller.load().await {
        show(|out| render::render_legacy(out, controller.run()))?;
        return Err(err.into());
    }
    show(|out| {
        render::render_legacy(out, controller.run())?;
        writeln!(out, "Answer with `<number> <answer>`, then `submit`. q to quit.")
    })?;

    let mut lines = stdin_lines();
    let mut ticker = ticker();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if matches!(input, "q" | "quit") {
                    break;
                }
                if input == "submit" {
                    if let Err(err) = controller.submit().await {
                        report_error(&err)?;
                    }
                    show(|out| render::render_legacy(out, controller.run()))?;
                } else if let Err(err) = legacy_answer(&mut controller, input) {
                    report_error(&err)?;
                }
                ticker.reset();
                if controller.run().phase() == LegacyPhase::Completed {
                    break;
                }
            }
            _ = ticker.tick() => {
                if controller.tick() == Some(TimerEvent::Expired) {
                    show(|out| writeln!(out, "Time is up. Submit when you are ready."))?;
                }
            }
        }
    }
    Ok(())
}

/// `<number> <answer>`; a choice letter is mapped to that option's value.
fn legacy_answer(controller: &mut LegacyTestController, input: &str) -> Result<(), ClientError> {
    let Some((number, answer)) = input.split_once(char::is_whitespace) else {
        return Ok(());
    };
    let Some(problem) = number
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| controller.run().problems().get(index))
    else {
        return Ok(());
    };

    let answer = answer.trim();
    let value = match (&problem.choices, render::choice_index(answer)) {
        (ProblemChoices::Options(options), Some(index)) if index < options.len() => {
            ProblemChoices::option_value(&options[index]).to_owned()
        }
        _ => answer.to_owned(),
    };
    let problem_id: ProblemId = problem.problem_id.clone();
    controller.answer(problem_id, value)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means the adaptive test.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Adaptive,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Adaptive,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = parsed.api_config()?;
    let client = Arc::new(HttpApiClient::new(config.clone())?);
    let context = parsed.context();

    match cmd {
        Command::Adaptive => run_adaptive(client, &config, context).await,
        Command::Legacy => run_legacy(client, &config, context).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
