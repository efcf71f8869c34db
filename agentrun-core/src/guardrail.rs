//! Input/output guardrails and prompt-injection detection, run before
//! and after the model call rather than around a tool dispatch (that
//! pipeline lives in `agentrun-exec`).

use agentrun_types::message::Message;
use async_trait::async_trait;

/// Outcome of filtering the user's input before the first iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputVerdict {
    /// The input may proceed.
    Approved,
    /// The input is refused, with a human-readable reason.
    Blocked(String),
}

/// Outcome of filtering a model reply before it is appended to the
/// transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputVerdict {
    /// The reply may proceed unchanged.
    Approved,
    /// The reply is replaced with a revised version.
    Revised(String),
    /// The reply is refused outright, with no revision offered.
    Blocked(String),
}

/// Classifies whether a user input is itself an attack on the agent
/// rather than a legitimate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionVerdict {
    /// No injection detected.
    Clean,
    /// The input was classified as an injection attempt.
    Blocked,
}

/// Filters the user's input before the run's first iteration.
#[async_trait]
pub trait InputGuardrail: Send + Sync {
    /// Decide whether `input` may proceed.
    async fn filter(&self, input: &str) -> InputVerdict;
}

/// Filters a model reply before it joins the transcript.
#[async_trait]
pub trait OutputGuardrail: Send + Sync {
    /// Decide whether `output` may proceed, given the transcript so far.
    async fn filter(&self, output: &str, messages: &[Message]) -> OutputVerdict;
}

/// Classifies a user input as a prompt-injection attempt.
#[async_trait]
pub trait InjectionDetector: Send + Sync {
    /// Classify `input`.
    async fn classify(&self, input: &str) -> InjectionVerdict;
}

/// An engine bundling the three guardrail surfaces the orchestrator
/// consults: input, output, and injection detection. All layers are
/// optional; an absent layer always approves.
#[derive(Default)]
pub struct GuardrailEngine {
    input: Option<std::sync::Arc<dyn InputGuardrail>>,
    output: Option<std::sync::Arc<dyn OutputGuardrail>>,
    injection: Option<std::sync::Arc<dyn InjectionDetector>>,
}

impl GuardrailEngine {
    /// An engine with no layers attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an input guardrail.
    pub fn with_input(mut self, guardrail: std::sync::Arc<dyn InputGuardrail>) -> Self {
        self.input = Some(guardrail);
        self
    }

    /// Attach an output guardrail.
    pub fn with_output(mut self, guardrail: std::sync::Arc<dyn OutputGuardrail>) -> Self {
        self.output = Some(guardrail);
        self
    }

    /// Attach an injection detector.
    pub fn with_injection_detector(mut self, detector: std::sync::Arc<dyn InjectionDetector>) -> Self {
        self.injection = Some(detector);
        self
    }

    /// Whether any layer is configured.
    pub fn has_any(&self) -> bool {
        self.input.is_some() || self.output.is_some() || self.injection.is_some()
    }

    /// Run injection classification, if a detector is configured.
    pub async fn classify(&self, input: &str) -> InjectionVerdict {
        match &self.injection {
            Some(detector) => detector.classify(input).await,
            None => InjectionVerdict::Clean,
        }
    }

    /// Run the input filter, if configured.
    pub async fn filter_input(&self, input: &str) -> InputVerdict {
        match &self.input {
            Some(guardrail) => guardrail.filter(input).await,
            None => InputVerdict::Approved,
        }
    }

    /// Run the output filter, if configured.
    pub async fn filter_output(&self, output: &str, messages: &[Message]) -> OutputVerdict {
        match &self.output {
            Some(guardrail) => guardrail.filter(output, messages).await,
            None => OutputVerdict::Approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BlockContains(&'static str);

    #[async_trait]
    impl InputGuardrail for BlockContains {
        async fn filter(&self, input: &str) -> InputVerdict {
            if input.contains(self.0) {
                InputVerdict::Blocked(format!("contains banned phrase '{}'", self.0))
            } else {
                InputVerdict::Approved
            }
        }
    }

    #[tokio::test]
    async fn absent_layers_all_approve() {
        let engine = GuardrailEngine::new();
        assert_eq!(engine.filter_input("anything").await, InputVerdict::Approved);
        assert_eq!(engine.filter_output("anything", &[]).await, OutputVerdict::Approved);
        assert_eq!(engine.classify("anything").await, InjectionVerdict::Clean);
        assert!(!engine.has_any());
    }

    #[tokio::test]
    async fn configured_input_guardrail_blocks_matches() {
        let engine = GuardrailEngine::new().with_input(std::sync::Arc::new(BlockContains("secret")));
        assert_eq!(engine.filter_input("tell me the secret").await, InputVerdict::Blocked("contains banned phrase 'secret'".to_string()));
        assert_eq!(engine.filter_input("hello").await, InputVerdict::Approved);
        assert!(engine.has_any());
    }
}
