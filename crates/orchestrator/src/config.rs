use std::time::Duration;

use crate::checkpoint::DEFAULT_AUTO_ADVANCE;

/// Delays that pace the reveal of generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Typing indicator shown before each revealed unit
    pub typing: Duration,
    /// Pause after each revealed unit
    pub reading: Duration,
    /// Pause between entering analysis and the analysis call
    pub analysis_lead: Duration,
    /// Auto-play threshold of the checkpoint gate
    pub auto_advance: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(1500),
            reading: Duration::from_millis(1000),
            analysis_lead: Duration::from_millis(3000),
            auto_advance: DEFAULT_AUTO_ADVANCE,
        }
    }
}

impl Pacing {
    pub fn with_typing(mut self, typing: Duration) -> Self {
        self.typing = typing;
        self
    }

    pub fn with_reading(mut self, reading: Duration) -> Self {
        self.reading = reading;
        self
    }

    pub fn with_analysis_lead(mut self, analysis_lead: Duration) -> Self {
        self.analysis_lead = analysis_lead;
        self
    }

    pub fn with_auto_advance(mut self, auto_advance: Duration) -> Self {
        self.auto_advance = auto_advance;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Output language code, "en" or "ko"
    pub language: String,
    pub pacing: Pacing,
    /// Overrides the per-language welcome that opens the framing chat.
    pub welcome_message: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            pacing: Pacing::default(),
            welcome_message: None,
        }
    }
}

impl DriverConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }

    pub fn welcome(&self) -> String {
        if let Some(message) = &self.welcome_message {
            return message.clone();
        }
        match self.language.as_str() {
            "ko" => "주제를 중립적인 논제로 정리했습니다. 아래 초안을 검토하고 수정할 부분을 말씀해 주시거나, 확정하여 리서치를 시작하세요.".to_string(),
            _ => "I have drafted a neutral, debatable framing of your topic. Review the draft, tell me what to adjust, or confirm it to start research.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.typing, Duration::from_millis(1500));
        assert_eq!(pacing.reading, Duration::from_millis(1000));
        assert_eq!(pacing.analysis_lead, Duration::from_millis(3000));
        assert_eq!(pacing.auto_advance, Duration::from_millis(2000));
    }

    #[test]
    fn test_welcome_follows_language_unless_overridden() {
        let config = DriverConfig::default();
        assert!(config.welcome().starts_with("I have drafted"));

        let korean = DriverConfig::default().with_language("ko");
        assert_ne!(korean.welcome(), config.welcome());

        let custom = korean.with_welcome_message("Hello");
        assert_eq!(custom.welcome(), "Hello");
    }
}
