use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::EnvFilter;
use volume_fader::config::{self, Config};
use volume_fader::control::{self, Message};
use volume_fader::simulated::SimulatedBackend;
use volume_fader::store::{self, KeyValueStore, MemoryStore};
use volume_fader::{Error, FaderController, Pacer, SerializedFader, StepOutcome, ThreadPacer};

#[derive(Parser, Debug)]
#[clap(
    name = "volume_fader",
    version,
    about = "Steps and fades audio input volumes, reading commands from stdin"
)]
struct Args {
    /// Config file, defaults to the platform config directory
    #[clap(long)]
    config: Option<PathBuf>,

    /// Input to simulate and its starting volume, e.g. --input Mic=-12
    #[clap(long = "input", value_name = "NAME=DB")]
    inputs: Vec<String>,

    /// Overrides the configured delay between fade steps
    #[clap(long)]
    step_delay_ms: Option<i64>,

    /// Writes the effective config and exits
    #[clap(long)]
    write_config: bool,
}

type Fader<'a, P = ThreadPacer> =
    SerializedFader<&'a SimulatedBackend, &'a MemoryStore, &'a SimulatedBackend, P>;

fn parse_seed(seed: &str) -> Result<(String, f64), Error> {
    match seed.rsplit_once('=') {
        Some((name, db)) if !name.is_empty() => match db.trim().parse::<f64>() {
            Ok(db) => Ok((String::from(name), db)),
            Err(_) => Err(Error::InvalidSeed(String::from(seed))),
        },
        _ => Err(Error::InvalidSeed(String::from(seed))),
    }
}

fn read_commands(sender: control::Sender) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                eprintln!("Failed to read stdin: {}", error);
                break;
            }
        };
        match control::parse(&line) {
            Ok(Some(message)) => {
                let quit = message == Message::Quit;
                if sender.send(message).is_err() || quit {
                    break;
                }
            }
            Ok(None) => (),
            Err(error) => eprintln!("{}", error),
        }
    }
}

fn print_published<W: Write>(out: &mut W, store: &MemoryStore, input: &str) -> io::Result<()> {
    let db = store.get(&store::volume_db_key(input));
    let mul = store.get(&store::volume_mul_key(input));
    if let (Some(db), Some(mul)) = (db, mul) {
        writeln!(
            out,
            "  {} = {}, {} = {}",
            store::volume_db_key(input),
            db,
            store::volume_mul_key(input),
            mul
        )?;
    }
    Ok(())
}

fn dispatch<P: Pacer, W: Write>(
    fader: &Fader<P>,
    store: &MemoryStore,
    config: &Config,
    message: Message,
    out: &mut W,
) -> Result<(), Error> {
    let fade_config = config.fade_config();
    match message {
        Message::StepUp { input } => {
            let outcome = fader.step_up(&input, config.max(), fade_config.step_size_db)?;
            report_step(out, store, &input, outcome)?;
        }
        Message::StepDown { input } => {
            let outcome = fader.step_down(&input, config.min(), fade_config.step_size_db)?;
            report_step(out, store, &input, outcome)?;
        }
        Message::Mute { scene, input } => {
            let reading = fader.fade_to_silence(&scene, &input, &fade_config)?;
            writeln!(out, "{}: muted in {} at {:.1} dB", input, scene, reading.gain_db)?;
            print_published(out, store, &input)?;
        }
        Message::Unmute { scene, input } => {
            let reading = fader.fade_from_silence(&scene, &input, &fade_config)?;
            writeln!(out, "{}: unmuted in {} at {:.1} dB", input, scene, reading.gain_db)?;
            print_published(out, store, &input)?;
        }
        Message::Show { input } => {
            let reading = fader.get_volume(&input)?;
            writeln!(
                out,
                "{}: {:.1} dB ({:.4})",
                input, reading.gain_db, reading.gain_linear
            )?;
            print_published(out, store, &input)?;
        }
        Message::State => {
            for (key, value) in store.snapshot() {
                writeln!(out, "  {} = {}", key, value)?;
            }
        }
        Message::Quit => (),
    }
    Ok(())
}

fn report_step<W: Write>(
    out: &mut W,
    store: &MemoryStore,
    input: &str,
    outcome: StepOutcome,
) -> io::Result<()> {
    match outcome {
        StepOutcome::Unchanged(reading) => {
            writeln!(out, "{}: unchanged at {:.1} dB", input, reading.gain_db)
        }
        StepOutcome::Changed(reading) => {
            writeln!(out, "{}: {:.1} dB", input, reading.gain_db)?;
            print_published(out, store, input)
        }
    }
}

// Runs commands one at a time in arrival order until quit or the channel closes.
// A fade blocks the commands queued behind it.
fn run<P: Pacer, W: Write>(
    fader: &Fader<P>,
    store: &MemoryStore,
    config: &Config,
    receiver: &control::Receiver,
    out: &mut W,
) -> Result<(), Error> {
    for message in receiver.iter() {
        if message == Message::Quit {
            break;
        }
        match dispatch(fader, store, config, message, out) {
            Ok(()) => (),
            Err(Error::IOError(error)) => return Err(Error::IOError(error)),
            Err(error) => writeln!(out, "error: {}", error)?,
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if let Some(step_delay_ms) = args.step_delay_ms {
        config.fade.step_delay_ms = step_delay_ms;
    }
    if args.write_config {
        config.save(&config_path)?;
        println!("Saved config to {}", config_path.display());
        return Ok(());
    }

    let backend = SimulatedBackend::new();
    for seed in &args.inputs {
        let (name, db) = parse_seed(seed)?;
        backend.add_input(&name, db);
    }
    let store = MemoryStore::new();
    let fader = SerializedFader::new(FaderController::new(&backend, &store, &backend));

    let (sender, receiver) = control::channel();
    // not joined: it may still be blocked on stdin after quit
    thread::spawn(move || read_commands(sender));

    let stdout = io::stdout();
    run(&fader, &store, &config, &receiver, &mut stdout.lock())?;
    Ok(())
}
