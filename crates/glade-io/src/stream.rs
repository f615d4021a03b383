//! Real-time audio output via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream, SupportedStreamConfig};
use glade_core::AudioRenderable;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Output channel count of the default config.
    pub channels: u16,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

/// Output stream configuration.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Output device by index, exact name or partial name (default device
    /// if `None`).
    pub output_device: Option<String>,
}

/// List all output devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            let Ok(name) = device_name(&device) else {
                continue;
            };
            let (channels, default_sample_rate) = device
                .default_output_config()
                .map(|c| (c.channels(), c.sample_rate()))
                .unwrap_or((2, 48000));
            devices.push(AudioDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                channels,
                default_sample_rate,
            });
        }
    }
    Ok(devices)
}

/// Get the default output device info.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| {
            let (channels, default_sample_rate) = d
                .default_output_config()
                .map(|c| (c.channels(), c.sample_rate()))
                .unwrap_or((2, 48000));
            AudioDevice {
                name,
                channels,
                default_sample_rate,
                is_default: true,
            }
        })
    }))
}

/// An output stream that pulls audio from a renderer on the device callback.
///
/// Opening picks the device and its default config; [`start`](Self::start)
/// moves the renderer into the callback and returns immediately. The stream
/// plays until [`stop`](Self::stop) or drop.
pub struct OutputStream {
    device: Device,
    config: SupportedStreamConfig,
    stream: Option<Stream>,
}

impl OutputStream {
    /// Open the configured output device.
    pub fn open(config: &StreamConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };
        let supported = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        tracing::info!(
            device = %device_name(&device).unwrap_or_default(),
            sample_rate = supported.sample_rate(),
            channels = supported.channels(),
            "output device opened"
        );
        Ok(Self {
            device,
            config: supported,
            stream: None,
        })
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate()
    }

    /// Device output channel count.
    pub fn channels(&self) -> u16 {
        self.config.channels()
    }

    /// Whether a renderer is playing.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Start playing `renderer`, replacing any previous one.
    ///
    /// Each callback zeroes the device buffer and lets the renderer add into
    /// it.
    pub fn start<R>(&mut self, mut renderer: R) -> Result<()>
    where
        R: AudioRenderable + Send + 'static,
    {
        let channels = usize::from(self.channels());
        renderer.set_sample_rate(self.sample_rate() as f32);

        let stream = self
            .device
            .build_output_stream(
                &self.config.clone().into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    renderer.render(data, channels);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;
        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop and drop the renderer.
    pub fn stop(&mut self) {
        self.stream = None;
    }
}

/// Find an output device by exact name, partial name, or index.
fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    for device in &devices {
        if device_name(device).is_ok_and(|n| n == name_or_index) {
            return Ok(device.clone());
        }
    }

    let search_lower = name_or_index.to_lowercase();
    let mut matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|name| name.to_lowercase().contains(&search_lower))
                .map(|name| (d.clone(), name))
        })
        .collect();

    match matches.len() {
        0 => Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            name_or_index
        ))),
        1 => Ok(matches.remove(0).0),
        _ => {
            let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
            tracing::warn!(
                search = name_or_index,
                ?names,
                "several output devices match, using the first"
            );
            Ok(matches.remove(0).0)
        }
    }
}
