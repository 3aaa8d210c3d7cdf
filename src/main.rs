use anyhow::{Context, Result};
use clap::Parser;
use dramatic::{Drama, Outputs, Pacing, Speed, Stream};
use pty::PtySession;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

mod pty;
mod pty_reader;

#[derive(Parser, Debug)]
#[command(
    name = "dramatic",
    about = "Print to the terminal dramatically, one keystroke at a time",
    version
)]
struct Args {
    /// Characters per second
    #[arg(long, env = "DRAMATIC_SPEED", default_value_t = Speed::DEFAULT)]
    speed: Speed,

    /// Type at an even pace instead of like a person
    #[arg(long)]
    steady: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Program to run in a pseudo-terminal, with its output replayed dramatically
    #[arg(short, long)]
    command: Option<String>,

    /// Files to replay (standard input if none), or arguments to pass to the command
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    if let Err(err) = dramatic::exit_on_interrupt(130) {
        warn!("Ctrl-C will not end the program: {err}");
    }

    let pacing = if args.steady {
        Pacing::steady()
    } else {
        Pacing::natural()
    };
    let mut outputs = Outputs::stdio().with_pacing(pacing);
    let mut scene = Drama::new().with_speed(args.speed).enter(&mut outputs);
    let out = scene.stdout();

    match args.command {
        Some(command) => run_program(&command, &args.args, out),
        None => {
            replay_files(&args.args, out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;
    Ok(())
}

/// Copy each file, or standard input for `-` or no files at all, to `out`.
fn replay_files(paths: &[String], out: &mut Stream) -> Result<()> {
    if paths.is_empty() {
        return replay_stdin(out);
    }
    for path in paths {
        if path == "-" {
            replay_stdin(out)?;
            continue;
        }
        let mut file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
        io::copy(&mut file, out).with_context(|| format!("Failed to replay {path}"))?;
    }
    out.flush()?;
    Ok(())
}

fn replay_stdin(out: &mut Stream) -> Result<()> {
    io::copy(&mut io::stdin().lock(), out).context("Failed to replay standard input")?;
    out.flush()?;
    Ok(())
}

/// Run `command` in a PTY, replay everything it prints to `out` and exit with
/// its exit code.
fn run_program(command: &str, args: &[String], out: &mut Stream) -> Result<ExitCode> {
    let (mut session, pty_io) = PtySession::spawn(command, args)?;
    pty_reader::forward_input(io::stdin(), pty_io.writer);

    for chunk in pty_reader::spawn_reader(pty_io.reader) {
        out.write_all(&chunk)?;
    }
    out.flush()?;

    let code = session.wait()?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)))
}
