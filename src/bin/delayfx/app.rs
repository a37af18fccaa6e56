//! Auditioner - builder and runner

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;

use delayfx::{
    control::drain,
    patch::EffectDescriptor,
    ConfigError, DesignCtx, Effect, EffectMessage, MAX_BLOCK_SIZE,
};

use super::source::PluckSource;
use super::ui::{EffectInfo, UiApp};

/// Samples forwarded to the UI for drawing.
const VIS_RING_SIZE: usize = 8192;
const CONTROL_RING_SIZE: usize = 64;

/// Strikes of the test string per second.
const PLUCK_RATE: f64 = 1.5;

/// Main application builder
pub struct Auditioner {
    effects: Vec<EffectDescriptor>,
}

impl Auditioner {
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Add an effect the user can switch to with Tab.
    pub fn effect(mut self, descriptor: EffectDescriptor) -> Self {
        self.effects.push(descriptor);
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        if self.effects.is_empty() {
            return Err(eyre!("no effects configured"));
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        if channels == 0 {
            return Err(ConfigError::ChannelCount(channels).into());
        }

        let ctx = DesignCtx::new(sample_rate)?;

        // Everything that allocates happens here, before the stream starts.
        let mut chain: Vec<Box<dyn Effect>> = self
            .effects
            .iter()
            .map(|descriptor| descriptor.build(&ctx))
            .collect::<Result<_, _>>()
            .wrap_err("failed to build effects")?;
        let infos: Vec<EffectInfo> = self
            .effects
            .iter()
            .map(|descriptor| EffectInfo {
                name: descriptor.name(),
                mix: descriptor.mix(),
            })
            .collect();

        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_RING_SIZE);
        let (msg_tx, mut msg_rx) = RingBuffer::<EffectMessage>::new(CONTROL_RING_SIZE);
        let (select_tx, mut select_rx) = RingBuffer::<usize>::new(CONTROL_RING_SIZE);

        let mut source = PluckSource::new(sample_rate, PLUCK_RATE);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut active = 0usize;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(index) = select_rx.pop() {
                    if index < chain.len() {
                        active = index;
                    }
                }
                let effect = &mut chain[active];
                drain(&mut msg_rx, effect);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];

                    for sample in block.iter_mut() {
                        *sample = source.next_sample() as f32;
                    }
                    effect.render(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let frame = out_off + i * channels;
                        data[frame..frame + channels].fill(s);
                        let _ = audio_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(audio_rx, msg_tx, select_tx, infos, sample_rate as f32)
            .run(&mut terminal);
        ratatui::restore();
        result
    }
}

impl Default for Auditioner {
    fn default() -> Self {
        Self::new()
    }
}
