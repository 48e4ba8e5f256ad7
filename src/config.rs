//! Configuration loading and management

use anyhow::{bail, Context, Result};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/subscribe";
const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Which transport handles the subscribe request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscribeMode {
    /// POST to the configured endpoint
    #[default]
    Live,
    /// Accept every address locally, like the stub deployment
    Test,
}

impl std::str::FromStr for SubscribeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            other => bail!("unknown subscribe mode '{other}' (expected 'live' or 'test')"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Full URL of the subscribe endpoint
    pub endpoint: String,

    /// Live or test-mode submission
    pub mode: SubscribeMode,

    /// Open the hardware output stream when audio is resumed
    pub audio_device: bool,

    /// Render rate used until a device reports its own
    pub sample_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            mode: SubscribeMode::default(),
            audio_device: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("TEXTILE_SIGNUP_ENDPOINT") {
            if endpoint.trim().is_empty() {
                bail!("TEXTILE_SIGNUP_ENDPOINT is set but empty");
            }
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(mode) = lookup("TEXTILE_SIGNUP_MODE") {
            config.mode = mode.parse().context("invalid TEXTILE_SIGNUP_MODE")?;
        }

        if let Some(audio) = lookup("TEXTILE_SIGNUP_AUDIO") {
            config.audio_device = parse_switch(&audio).context("invalid TEXTILE_SIGNUP_AUDIO")?;
        }

        if let Some(rate) = lookup("TEXTILE_SIGNUP_SAMPLE_RATE") {
            let rate: u32 = rate
                .trim()
                .parse()
                .context("invalid TEXTILE_SIGNUP_SAMPLE_RATE")?;
            if rate == 0 {
                bail!("TEXTILE_SIGNUP_SAMPLE_RATE must be positive");
            }
            config.sample_rate = rate;
        }

        Ok(config)
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        other => bail!("expected on/off, got '{other}'"),
    }
}
