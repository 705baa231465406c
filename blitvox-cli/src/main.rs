//! blitvox CLI: play a VCO -> VCF voice live, or render it to a WAV file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use blitvox_engine::{Engine, Patch, VcfParams, VcoParams, Waveform};
use clap::{Parser, ValueEnum};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no default output device")]
    NoDevice,

    #[error("requested device not found: {0}")]
    DeviceNotFound(String),

    #[error("no supported output configs")]
    NoConfig,

    #[error("unsupported device sample format: {0}")]
    UnsupportedFormat(String),

    #[error("device enumeration failed: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("device name unavailable: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    #[error("default stream config unavailable: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("supported stream configs unavailable: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}

/// Which oscillator output feeds the filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Wave {
    Ramp,
    Pulse,
    SawTri,
    Triangle,
}

impl From<Wave> for Waveform {
    fn from(w: Wave) -> Self {
        match w {
            Wave::Ramp => Waveform::Ramp,
            Wave::Pulse => Waveform::Pulse,
            Wave::SawTri => Waveform::SawTri,
            Wave::Triangle => Waveform::Triangle,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "blitvox", version, about = "Band-limited VCO into a resonant ladder VCF")]
struct Args {
    /// List output devices and exit.
    #[arg(long)]
    list_devices: bool,

    /// Output device name (default device if omitted).
    #[arg(long)]
    device: Option<String>,

    /// Requested sample rate in Hz.
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Requested channel count.
    #[arg(long)]
    channels: Option<u16>,

    /// Stop after this many seconds (playback runs until Ctrl+C otherwise).
    #[arg(long)]
    duration: Option<f32>,

    /// Render offline to this WAV file instead of playing.
    #[arg(long, value_name = "WAV")]
    render: Option<PathBuf>,

    /// Output gain.
    #[arg(long, default_value_t = 0.35)]
    gain: f32,

    /// Pitch in volts, 1 V/oct, 0 = C4.
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pitch: f32,

    /// Fine tune, -15..15.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    tune: f32,

    /// Octave offset, -3..3.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    octave: f32,

    /// Pulse width, 0.1..1.
    #[arg(long, default_value_t = 0.5)]
    pulse_width: f32,

    /// Waveshaper amount, 0.1..1 (1 = clean).
    #[arg(long, default_value_t = 1.0)]
    saturation: f32,

    /// Oscillator output routed into the filter.
    #[arg(long, value_enum, default_value_t = Wave::Ramp)]
    wave: Wave,

    /// Filter cutoff knob, 0..1.
    #[arg(long, default_value_t = 0.55)]
    cutoff: f32,

    /// Filter resonance, 0..1.
    #[arg(long, default_value_t = 0.4)]
    resonance: f32,

    /// LFO depth on the cutoff CV, 0..1.
    #[arg(long, default_value_t = 0.3)]
    lfo_depth: f32,

    /// LFO rate in Hz.
    #[arg(long, default_value_t = 0.2)]
    lfo_rate: f32,
}

const DEFAULT_RENDER_SECONDS: f32 = 5.0;
const DEFAULT_RENDER_RATE: u32 = 48_000;

/// Clamp a panel value into its range, warning when the request was outside it.
fn panel(name: &str, value: f32, lo: f32, hi: f32) -> f32 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!(%name, requested = value, used = clamped, "value clamped into {lo}..{hi}");
    }
    clamped
}

fn make_patch(args: &Args, sr: f32) -> Patch {
    let mut patch = Patch::new(sr);
    patch.set_vco_params(VcoParams {
        tune: panel("tune", args.tune, -15.0, 15.0),
        octave: panel("octave", args.octave, -3.0, 3.0),
        saturation: panel("saturation", args.saturation, 0.1, 1.0),
        pulse_width: panel("pulse-width", args.pulse_width, 0.1, 1.0),
        ..VcoParams::default()
    });
    patch.set_vcf_params(VcfParams {
        cutoff: panel("cutoff", args.cutoff, 0.0, 1.0),
        resonance: panel("resonance", args.resonance, 0.0, 1.0),
        cutoff_cv_amount: 1.0,
        resonance_cv_amount: 0.0,
    });
    patch.set_lfo(args.lfo_rate, args.lfo_depth);
    patch.set_waveform(args.wave.into());
    patch.set_pitch(args.pitch);
    patch.set_gain(args.gain);
    patch
}

fn list_output_devices() -> Result<(), CliError> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(args: &Args) -> Result<cpal::Device, CliError> {
    let host = cpal::default_host();
    if let Some(name) = &args.device {
        for d in host.output_devices()? {
            if d.name()? == *name {
                return Ok(d);
            }
        }
        return Err(CliError::DeviceNotFound(name.clone()));
    }
    host.default_output_device().ok_or(CliError::NoDevice)
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig, CliError> {
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // closest range wins; sample-rate distance dominates channel distance
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch = range.channels();
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = req_ch.map_or(0, |c| u64::from(ch.abs_diff(c)));
        let sr_pen = match req_sr {
            Some(sr) if !(sr_min..=sr_max).contains(&sr) => {
                u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr)))
            }
            _ => 0,
        };

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or(CliError::NoConfig)?;
    let pick_sr = pick_rate(req_sr, range.min_sample_rate().0, range.max_sample_rate().0);
    Ok(range.with_sample_rate(cpal::SampleRate(pick_sr)))
}

/// Requested rate clamped into the device range, or the range maximum.
fn pick_rate(req_sr: Option<u32>, min: u32, max: u32) -> u32 {
    req_sr.map_or(max, |sr| sr.clamp(min, max))
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut engine: Engine<Patch>,
) -> Result<cpal::Stream, CliError>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let sr = cfg.sample_rate.0 as f32;
    let channels = usize::from(cfg.channels).max(1);

    // ~1 second peak meter
    let meter_interval = (cfg.sample_rate.0).max(1) as usize;
    let mut meter_count: usize = 0;
    let mut meter_peak: f32 = 0.0;

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            for frame in output.chunks_mut(channels) {
                let s = engine.next(sr).clamp(-1.0, 1.0);
                let v: T = T::from_sample(s);
                for ch in frame.iter_mut() {
                    *ch = v;
                }

                meter_peak = meter_peak.max(s.abs());
                meter_count += 1;
                if meter_count >= meter_interval {
                    info!(peak = meter_peak, "meter");
                    meter_peak = 0.0;
                    meter_count = 0;
                }
            }
        },
        |e| error!("stream error: {e}"),
        None,
    )?;

    Ok(stream)
}

fn play(args: &Args) -> Result<(), CliError> {
    let device = pick_device(args)?;
    let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    let cfg = sup_cfg.config();

    if args.sample_rate.is_some_and(|sr| sr != cfg.sample_rate.0) {
        warn!(requested = args.sample_rate, used = cfg.sample_rate.0, "sample rate not supported by device");
    }
    if args.channels.is_some_and(|ch| ch != cfg.channels) {
        warn!(requested = args.channels, used = cfg.channels, "channel count not supported by device");
    }

    let sr = cfg.sample_rate.0 as f32;
    let engine = Engine::new(make_patch(args, sr), sr);

    info!(device = %device.name()?, "using output device");
    info!(?cfg, ?sample_format, "stream config");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, engine)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, engine)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, engine)?,
        other => return Err(CliError::UnsupportedFormat(format!("{other:?}"))),
    };

    stream.play()?;

    if let Some(d) = args.duration {
        info!(seconds = d, "auto-stop armed");
        std::thread::sleep(Duration::from_secs_f32(d.max(0.0)));
        return Ok(());
    }

    info!("press Ctrl+C to stop");
    loop {
        std::thread::sleep(Duration::from_millis(500));
    }
}

/// Render the patch to a 32-bit float WAV; returns the number of frames written.
fn render(args: &Args, path: &Path) -> Result<u64, CliError> {
    let sample_rate = args.sample_rate.unwrap_or(DEFAULT_RENDER_RATE).max(1);
    let channels = args.channels.unwrap_or(1).max(1);
    let seconds = args.duration.unwrap_or(DEFAULT_RENDER_SECONDS).max(0.0);
    let frames = (seconds * sample_rate as f32).round() as u64;

    let sr = sample_rate as f32;
    let mut engine = Engine::new(make_patch(args, sr), sr);

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let mut block = [0.0_f32; 1024];
    let mut written = 0_u64;
    let mut peak = 0.0_f32;
    while written < frames {
        let n = (frames - written).min(block.len() as u64) as usize;
        engine.render(&mut block[..n]);
        for &s in &block[..n] {
            let s = s.clamp(-1.0, 1.0);
            peak = peak.max(s.abs());
            for _ in 0..channels {
                writer.write_sample(s)?;
            }
        }
        written += n as u64;
    }
    writer.finalize()?;

    info!(path = %path.display(), frames = written, sample_rate, channels, peak, "render finished");
    Ok(written)
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.list_devices {
        return list_output_devices();
    }

    match &args.render {
        Some(path) => render(&args, path).map(|_| ()),
        None => play(&args),
    }
}
