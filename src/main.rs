//! adxplay command line player
//!
//! Routes a file to the right decoder by magic-byte sniffing, optionally
//! identifies the track against a song table, and renders to WAV or (with
//! the `streaming` feature) plays it on the default audio device.

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use adxplay::{
    detect_format, AdxDecoder, AudioDecoder, AudioFormat, LoopMode, PlayerConfig, WavSink,
};

#[cfg(feature = "segacd")]
use adxplay::PcmDecoder;
#[cfg(feature = "songdb")]
use adxplay::SongTable;
#[cfg(feature = "streaming")]
use adxplay::{AudioDevice, RingBuffer, StreamConfig, StreamSink};

const USAGE: &str = "Usage: adxplay [OPTIONS] <FILE>

Decode a CRI ADX (or Sega-CD PCM) file.

Options:
  -o, --output <FILE>   Write WAV to FILE (default: input with .wav extension)
  -l, --loops <N>       Take the loop seam N times (default: 1 for WAV output)
      --forever         Loop until stopped (implied by --play)
      --play            Play on the default audio device (needs the
                        \"streaming\" feature)
      --config <FILE>   JSON configuration file
      --db <FILE>       Song identification CSV
  -h, --help            Show this help";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    loops: Option<u32>,
    forever: bool,
    play: bool,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut output = None;
    let mut loops = None;
    let mut forever = false;
    let mut play = false;
    let mut config = None;
    let mut db = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(
                    args.next().context("missing value for --output")?,
                ));
            }
            "-l" | "--loops" => {
                let value = args.next().context("missing value for --loops")?;
                loops = Some(value.parse::<u32>().context("bad value for --loops")?);
            }
            "--forever" => forever = true,
            "--play" => play = true,
            "--config" => {
                config = Some(PathBuf::from(
                    args.next().context("missing value for --config")?,
                ));
            }
            "--db" => {
                db = Some(PathBuf::from(
                    args.next().context("missing value for --db")?,
                ));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option {other}\n{USAGE}"),
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one input file\n{USAGE}");
                }
            }
        }
    }

    Ok(Args {
        input: input.with_context(|| format!("no input file\n{USAGE}"))?,
        output,
        loops,
        forever,
        play,
        config,
        db,
    })
}

fn open_decoder(
    path: &Path,
    format: AudioFormat,
    loop_mode: LoopMode,
    config: &PlayerConfig,
) -> Result<Box<dyn AudioDecoder>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    match format {
        AudioFormat::Adx => Ok(Box::new(AdxDecoder::new(file, loop_mode)?)),
        #[cfg(feature = "segacd")]
        AudioFormat::SegaCdPcm => Ok(Box::new(PcmDecoder::new(
            file,
            loop_mode,
            Some(config.pcm_sample_rate),
        )?)),
        #[cfg(not(feature = "segacd"))]
        AudioFormat::SegaCdPcm => {
            let _ = config;
            bail!("Sega-CD PCM support requires the \"segacd\" feature")
        }
        AudioFormat::Unknown => bail!(
            "{} is not a recognized ADX or Sega-CD PCM file",
            path.display()
        ),
    }
}

#[cfg(feature = "songdb")]
fn identify_song(args: &Args, config: &PlayerConfig, head: &[u8]) -> Result<()> {
    let db_path = args.db.clone().or_else(|| config.song_db.clone());
    if let Some(path) = db_path {
        let table = SongTable::load(&path)?;
        match table.identify(head) {
            Some(entry) => {
                println!("Track: {} [{}] ({})", entry.title, entry.kind, entry.filename)
            }
            None => println!("Track: (not in song table)"),
        }
    }
    Ok(())
}

#[cfg(not(feature = "songdb"))]
fn identify_song(_args: &Args, _config: &PlayerConfig, _head: &[u8]) -> Result<()> {
    Ok(())
}

#[cfg(feature = "streaming")]
fn play_live(decoder: &mut dyn AudioDecoder, stop: &Arc<AtomicBool>) -> Result<u64> {
    let config = StreamConfig::stable(decoder.sample_rate(), decoder.channels());
    let ring = Arc::new(RingBuffer::new(config.ring_buffer_size)?);
    let device = AudioDevice::new(config, Arc::clone(&ring))?;

    let mut sink = StreamSink::new(ring, Arc::clone(stop));
    let written = decoder.decode_to(&mut sink, stop)?;
    sink.drain();
    device.finish();
    device.wait_for_finish();
    Ok(written)
}

#[cfg(not(feature = "streaming"))]
fn play_live(_decoder: &mut dyn AudioDecoder, _stop: &Arc<AtomicBool>) -> Result<u64> {
    bail!("playback requires the \"streaming\" feature; rebuild with `--features streaming`")
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };

    let loop_mode = if args.forever || (args.play && args.loops.is_none()) {
        LoopMode::Infinite
    } else {
        match args.loops {
            Some(n) => LoopMode::Count(n),
            None => config.loop_mode(),
        }
    };

    // One 8 KiB probe serves format sniffing and song identification.
    let mut head = vec![0u8; 8192];
    let mut file =
        File::open(&args.input).with_context(|| format!("cannot open {}", args.input.display()))?;
    let got = file.read(&mut head)?;
    head.truncate(got);
    drop(file);

    let name_hint = args.input.to_string_lossy();
    let format = detect_format(&head, Some(&name_hint));
    identify_song(&args, &config, &head)?;

    let mut decoder = open_decoder(&args.input, format, loop_mode, &config)?;
    let sample_rate = decoder.sample_rate();
    let channels = decoder.channels();
    println!("Format: {format:?}, {sample_rate} Hz, {channels} channel(s)");

    let stop = Arc::new(AtomicBool::new(false));

    let written = if args.play {
        play_live(decoder.as_mut(), &stop)?
    } else {
        let out_path = args
            .output
            .clone()
            .unwrap_or_else(|| args.input.with_extension("wav"));
        let mut sink = WavSink::create(&out_path, sample_rate, channels)?;
        let written = decoder.decode_to(&mut sink, &stop)?;
        sink.finalize()?;
        println!("Wrote {}", out_path.display());
        written
    };

    let seconds = written as f64 / (f64::from(sample_rate) * f64::from(channels.max(1)));
    println!("Decoded {written} samples ({seconds:.2} s)");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("adxplay: {err:#}");
        process::exit(1);
    }
}
