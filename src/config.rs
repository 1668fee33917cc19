use crate::speech::SpeechCommand;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Command-line / environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pysleuth",
    version,
    about = "Desktop client for the PySleuth AI Python debugger"
)]
pub struct Config {
    /// Base URL of the analysis service.
    #[arg(long, env = "PYSLEUTH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// TCP connect timeout, in seconds.
    #[arg(long, env = "PYSLEUTH_CONNECT_TIMEOUT", default_value_t = 5)]
    pub connect_timeout_secs: u64,

    /// Timeout for a whole analysis request, in seconds.
    #[arg(long, env = "PYSLEUTH_REQUEST_TIMEOUT", default_value_t = 120)]
    pub request_timeout_secs: u64,

    /// Program (with arguments) that reads text on stdin and speaks it.
    /// Defaults to the platform's built-in synthesizer.
    #[arg(long, env = "PYSLEUTH_SPEECH_COMMAND")]
    pub speech_command: Option<String>,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    pub fn debug_endpoint(&self) -> String {
        format!("{}/debug", self.api_url.trim_end_matches('/'))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn speech_command(&self) -> Result<SpeechCommand> {
        match &self.speech_command {
            Some(line) => SpeechCommand::parse(line),
            None => Ok(SpeechCommand::platform_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_loopback() {
        let config = Config::try_parse_from(["pysleuth"]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.debug_endpoint(), "http://127.0.0.1:8000/debug");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert!(!config.log_json);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_endpoint() {
        let config =
            Config::try_parse_from(["pysleuth", "--api-url", "https://sleuth.example.com/"])
                .unwrap();
        assert_eq!(config.debug_endpoint(), "https://sleuth.example.com/debug");
    }

    #[test]
    fn speech_command_override_is_split_like_a_shell() {
        let config = Config::try_parse_from([
            "pysleuth",
            "--speech-command",
            "espeak-ng -v 'en-us' --stdin",
        ])
        .unwrap();
        let command = config.speech_command().unwrap();
        assert_eq!(command.program, "espeak-ng");
        assert_eq!(command.args, vec!["-v", "en-us", "--stdin"]);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Config::try_parse_from(["pysleuth", "--request-timeout-secs", "soon"]).is_err());
    }
}
