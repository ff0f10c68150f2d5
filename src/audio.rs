use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::{HeapCons, HeapRb};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

pub const FFT_SIZE: usize = 256;
pub const BIN_COUNT: usize = FFT_SIZE / 2;

const SMOOTHING: f32 = 0.8;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySample {
    bins: Vec<u8>,
}

impl FrequencySample {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

impl From<Vec<u8>> for FrequencySample {
    fn from(bins: Vec<u8>) -> Self {
        Self::new(bins)
    }
}

/// A live source of frequency data, polled once per frame.
///
/// Implementations must not block: when nothing new has arrived they hand
/// back the most recent bins again.
pub trait SampleSource {
    fn sample(&mut self) -> FrequencySample;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioAccessError {
    PermissionDenied(String),
    DeviceUnavailable(String),
}

impl AudioAccessError {
    pub fn from_backend_message(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let lower = detail.to_lowercase();
        if ["permission", "denied", "authorized", "authorised", "not allowed"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            Self::PermissionDenied(detail)
        } else {
            Self::DeviceUnavailable(detail)
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => {
                "Microphone access denied. Showing the idle visualization; allow microphone access and restart to make it react."
            }
            Self::DeviceUnavailable(_) => {
                "No microphone available. Showing the idle visualization; connect an input device and restart."
            }
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::PermissionDenied(d) | Self::DeviceUnavailable(d) => d,
        }
    }
}

impl fmt::Display for AudioAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied(d) => write!(f, "microphone permission denied: {d}"),
            Self::DeviceUnavailable(d) => write!(f, "microphone unavailable: {d}"),
        }
    }
}

impl std::error::Error for AudioAccessError {}

impl From<cpal::DevicesError> for AudioAccessError {
    fn from(err: cpal::DevicesError) -> Self {
        Self::from_backend_message(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioAccessError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                Self::from_backend_message(err.description)
            }
            other => Self::DeviceUnavailable(other.to_string()),
        }
    }
}

impl From<cpal::BuildStreamError> for AudioAccessError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::BackendSpecific { err } => {
                Self::from_backend_message(err.description)
            }
            other => Self::DeviceUnavailable(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for AudioAccessError {
    fn from(err: cpal::PlayStreamError) -> Self {
        match err {
            cpal::PlayStreamError::BackendSpecific { err } => {
                Self::from_backend_message(err.description)
            }
            other => Self::DeviceUnavailable(other.to_string()),
        }
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

// The host callback only downmixes and pushes into the ring; analysis runs on
// the caller's thread inside `sample()`.
pub struct AudioSampler {
    _stream: cpal::Stream,
    spectrum: RollingSpectrum,
    pub device_name: String,
}

impl AudioSampler {
    pub fn request_access(device_query: Option<&str>) -> Result<Self, AudioAccessError> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let supported = device.default_input_config()?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = (supported.channels() as usize).max(1);
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).max(FFT_SIZE);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, cons) = rb.split();

        let err_fn = |err| log::warn!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => {
                return Err(AudioAccessError::DeviceUnavailable(format!(
                    "unsupported sample format: {fmt:?}"
                )));
            }
        };

        stream.play()?;
        log::info!(
            "capturing from '{device_name}' at {sample_rate_hz} Hz, {channels} channel(s)"
        );

        Ok(Self {
            _stream: stream,
            spectrum: RollingSpectrum::new(cons),
            device_name,
        })
    }
}

impl SampleSource for AudioSampler {
    fn sample(&mut self) -> FrequencySample {
        self.spectrum.sample()
    }
}

/// Keeps the newest `FFT_SIZE` mono samples drained from a ring and turns
/// them into bins on demand. With nothing new in the ring, `sample()` hands
/// back the previous bins without advancing the smoothing.
pub struct RollingSpectrum {
    cons: HeapCons<f32>,
    scratch: Vec<f32>,
    write_pos: usize,
    ordered: Vec<f32>,
    analyser: SpectrumAnalyser,
    last: FrequencySample,
}

impl RollingSpectrum {
    pub fn new(cons: HeapCons<f32>) -> Self {
        Self {
            cons,
            scratch: vec![0.0; FFT_SIZE],
            write_pos: 0,
            ordered: vec![0.0; FFT_SIZE],
            analyser: SpectrumAnalyser::new(FFT_SIZE),
            last: FrequencySample::silent(BIN_COUNT),
        }
    }

    // Oldest first, as of the last analysis.
    pub fn window(&self) -> &[f32] {
        &self.ordered
    }
}

impl SampleSource for RollingSpectrum {
    fn sample(&mut self) -> FrequencySample {
        let n = self.scratch.len();
        let mut fresh = 0usize;
        while let Some(s) = self.cons.try_pop() {
            if !s.is_finite() {
                continue;
            }
            self.scratch[self.write_pos] = s;
            self.write_pos = (self.write_pos + 1) % n;
            fresh += 1;
        }
        if fresh == 0 {
            return self.last.clone();
        }

        for (i, dst) in self.ordered.iter_mut().enumerate() {
            *dst = self.scratch[(self.write_pos + i) % n];
        }
        let bins = self.analyser.analyse(&self.ordered);
        self.last = FrequencySample::new(bins.to_vec());
        self.last.clone()
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> Result<cpal::Device, AudioAccessError> {
    let devices = host.input_devices()?.collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(AudioAccessError::DeviceUnavailable(format!(
            "no input device matching: {want}"
        )));
    }

    host.default_input_device().ok_or_else(|| {
        AudioAccessError::DeviceUnavailable("no default input device found".to_string())
    })
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        if mono.is_finite() {
            let _ = prod.try_push(mono);
        }
    }
}

pub struct SpectrumAnalyser {
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buf: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(fft_size: usize) -> Self {
        let n = fft_size.max(2);
        let window = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect::<Vec<_>>();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);

        Self {
            window,
            fft,
            fft_buf: vec![Complex { re: 0.0, im: 0.0 }; n],
            smoothed: vec![0.0; n / 2],
            bytes: vec![0; n / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bytes.len()
    }

    pub fn analyse(&mut self, samples: &[f32]) -> &[u8] {
        let n = self.window.len();
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, c) in self.fft_buf.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { tail[i - pad] };
            c.re = if s.is_finite() { s * self.window[i] } else { 0.0 };
            c.im = 0.0;
        }
        self.fft.process(&mut self.fft_buf);

        let scale = 255.0 / (MAX_DB - MIN_DB);
        for (i, c) in self.fft_buf.iter().take(self.bytes.len()).enumerate() {
            let mag = (c.re * c.re + c.im * c.im).sqrt() / n as f32;
            let mut v = SMOOTHING * self.smoothed[i] + (1.0 - SMOOTHING) * mag;
            // Overflow must not stick in the smoothing state.
            if !v.is_finite() {
                v = 0.0;
            }
            self.smoothed[i] = v;

            let db = if v > 0.0 { 20.0 * v.log10() } else { f32::NEG_INFINITY };
            self.bytes[i] = ((db - MIN_DB) * scale).floor().clamp(0.0, 255.0) as u8;
        }
        &self.bytes
    }
}
