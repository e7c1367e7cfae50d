//! Request mediation
//!
//! Intercepts a capability request from the hosted web content and
//! resolves it against the [`PermissionManager`]: trusted origins and stored
//! decisions answer directly, undecided pairs go to a [`PermissionPrompt`].

use super::manager::PermissionManager;
use super::origin::extract_origin;
use crate::core::GateResult;

/// A capability request made by web content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    /// Normalized requesting origin
    pub origin: String,
    /// Capability name, e.g. "notifications"
    pub capability: String,
    /// Full URL of the requesting page, when known
    pub url: Option<String>,
}

impl PermissionRequest {
    /// Create a request for an already normalized origin
    pub fn new(origin: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            capability: capability.into(),
            url: None,
        }
    }

    /// Create a request from the URL of the requesting page
    ///
    /// Returns `None` when the URL has no tuple origin.
    pub fn from_url(url: &str, capability: impl Into<String>) -> Option<Self> {
        let origin = extract_origin(url)?;
        Some(Self {
            origin,
            capability: capability.into(),
            url: Some(url.to_string()),
        })
    }
}

/// The user's answer to a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Allow this request only
    Allow,
    /// Deny this request only
    Deny,
    /// Allow and remember
    AlwaysAllow,
    /// Deny and remember
    AlwaysDeny,
}

impl PromptAnswer {
    /// Whether the request goes through
    pub fn allows(&self) -> bool {
        matches!(self, Self::Allow | Self::AlwaysAllow)
    }

    /// Whether the answer is recorded in the store
    pub fn is_remembered(&self) -> bool {
        matches!(self, Self::AlwaysAllow | Self::AlwaysDeny)
    }
}

/// Asks the user about an undecided request
pub trait PermissionPrompt {
    /// Present the request and return the user's answer
    fn ask(&self, request: &PermissionRequest) -> GateResult<PromptAnswer>;
}

/// How a verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    /// The origin is trusted
    Trusted,
    /// A decision was already stored
    Stored,
    /// The user was asked
    Prompted,
    /// The request could not be attributed to an origin
    Rejected,
}

/// Final answer for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Granted(VerdictSource),
    Denied(VerdictSource),
}

impl Verdict {
    /// Whether the capability may be used
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// How the verdict was reached
    pub fn source(&self) -> VerdictSource {
        match self {
            Self::Granted(source) | Self::Denied(source) => *source,
        }
    }
}

/// Resolves capability requests, prompting for undecided ones
pub struct PermissionMediator<P: PermissionPrompt> {
    prompt: P,
}

impl<P: PermissionPrompt> PermissionMediator<P> {
    /// Create a mediator that asks through `prompt`
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    /// The prompt collaborator
    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Resolve a request against the store
    ///
    /// A failure to persist a remembered answer is logged and the answer is
    /// still applied to this request. Prompt failures are returned.
    pub fn handle(
        &self,
        manager: &mut PermissionManager,
        request: &PermissionRequest,
    ) -> GateResult<Verdict> {
        let origin = request.origin.as_str();
        let capability = request.capability.as_str();

        if manager.is_trusted(origin) {
            tracing::debug!("Trusted origin {} granted {}", origin, capability);
            return Ok(Verdict::Granted(VerdictSource::Trusted));
        }
        if manager.is_granted(origin, capability) {
            tracing::debug!("Stored grant for {} on {}", capability, origin);
            return Ok(Verdict::Granted(VerdictSource::Stored));
        }
        if manager.is_denied(origin, capability) {
            tracing::debug!("Stored denial for {} on {}", capability, origin);
            return Ok(Verdict::Denied(VerdictSource::Stored));
        }

        let answer = self.prompt.ask(request)?;
        tracing::info!("User answered {:?} for {} on {}", answer, capability, origin);

        let recorded = match answer {
            PromptAnswer::AlwaysAllow => manager.grant(origin, capability),
            PromptAnswer::AlwaysDeny => manager.deny(origin, capability),
            PromptAnswer::Allow | PromptAnswer::Deny => Ok(()),
        };
        if let Err(e) = recorded {
            tracing::error!("Decision may not survive restart: {}", e);
        }

        Ok(if answer.allows() {
            Verdict::Granted(VerdictSource::Prompted)
        } else {
            Verdict::Denied(VerdictSource::Prompted)
        })
    }

    /// Resolve a request given the URL of the requesting page
    ///
    /// Pages without a tuple origin are denied without prompting.
    pub fn handle_url(
        &self,
        manager: &mut PermissionManager,
        url: &str,
        capability: &str,
    ) -> GateResult<Verdict> {
        match PermissionRequest::from_url(url, capability) {
            Some(request) => self.handle(manager, &request),
            None => {
                tracing::warn!("Rejecting {} request from opaque origin {}", capability, url);
                Ok(Verdict::Denied(VerdictSource::Rejected))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GateError;
    use crate::permissions::PermissionDecision;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::TempDir;

    /// Replies with queued answers and counts calls
    struct ScriptedPrompt {
        answers: RefCell<Vec<PromptAnswer>>,
        calls: Cell<usize>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[PromptAnswer]) -> Self {
            let mut answers = answers.to_vec();
            answers.reverse();
            Self {
                answers: RefCell::new(answers),
                calls: Cell::new(0),
            }
        }
    }

    impl PermissionPrompt for ScriptedPrompt {
        fn ask(&self, _request: &PermissionRequest) -> GateResult<PromptAnswer> {
            self.calls.set(self.calls.get() + 1);
            self.answers
                .borrow_mut()
                .pop()
                .ok_or_else(|| GateError::Prompt("no scripted answer left".into()))
        }
    }

    fn setup(trusted: &[&str]) -> (PermissionManager, TempDir) {
        let temp = TempDir::new().unwrap();
        let manager = PermissionManager::new(temp.path().join("permission.json"), trusted);
        (manager, temp)
    }

    #[test]
    fn test_trusted_origin_never_prompts() {
        let (mut manager, _temp) = setup(&["https://chat.example.com"]);
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[]));

        let verdict = mediator
            .handle(&mut manager, &PermissionRequest::new("https://chat.example.com", "media"))
            .unwrap();

        assert_eq!(verdict, Verdict::Granted(VerdictSource::Trusted));
        assert_eq!(mediator.prompt().calls.get(), 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_always_answers_are_remembered() {
        let (mut manager, _temp) = setup(&[]);
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[
            PromptAnswer::AlwaysAllow,
            PromptAnswer::AlwaysDeny,
        ]));
        let notifications = PermissionRequest::new("https://a.example", "notifications");
        let geolocation = PermissionRequest::new("https://a.example", "geolocation");

        let first = mediator.handle(&mut manager, &notifications).unwrap();
        let second = mediator.handle(&mut manager, &geolocation).unwrap();
        assert_eq!(first, Verdict::Granted(VerdictSource::Prompted));
        assert_eq!(second, Verdict::Denied(VerdictSource::Prompted));

        // Stored now, no further prompts
        let again = mediator.handle(&mut manager, &notifications).unwrap();
        let again_denied = mediator.handle(&mut manager, &geolocation).unwrap();
        assert_eq!(again, Verdict::Granted(VerdictSource::Stored));
        assert_eq!(again_denied, Verdict::Denied(VerdictSource::Stored));
        assert_eq!(mediator.prompt().calls.get(), 2);
    }

    #[test]
    fn test_one_shot_answers_are_not_recorded() {
        let (mut manager, _temp) = setup(&[]);
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[
            PromptAnswer::Allow,
            PromptAnswer::Deny,
        ]));
        let request = PermissionRequest::new("https://a.example", "notifications");

        assert!(mediator.handle(&mut manager, &request).unwrap().is_granted());
        assert!(!mediator.handle(&mut manager, &request).unwrap().is_granted());
        assert_eq!(mediator.prompt().calls.get(), 2);
        assert_eq!(manager.decision("https://a.example", "notifications"), None);
    }

    #[test]
    fn test_prompt_error_propagates() {
        let (mut manager, _temp) = setup(&[]);
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[]));

        let result = mediator.handle(&mut manager, &PermissionRequest::new("o", "p"));
        assert!(matches!(result, Err(GateError::Prompt(_))));
    }

    #[test]
    fn test_persistence_failure_still_applies_answer() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut manager =
            PermissionManager::new(blocker.join("permission.json"), Vec::<String>::new());
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[PromptAnswer::AlwaysDeny]));

        let verdict = mediator
            .handle(&mut manager, &PermissionRequest::new("o", "p"))
            .unwrap();

        assert_eq!(verdict, Verdict::Denied(VerdictSource::Prompted));
        assert_eq!(manager.decision("o", "p"), Some(PermissionDecision::Denied));
    }

    #[test]
    fn test_handle_url_normalizes_origin() {
        let (mut manager, _temp) = setup(&[]);
        manager.grant("https://chat.example.com", "notifications").unwrap();
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[]));

        let verdict = mediator
            .handle_url(
                &mut manager,
                "https://Chat.Example.com:443/team/channels/town-square",
                "notifications",
            )
            .unwrap();
        assert_eq!(verdict, Verdict::Granted(VerdictSource::Stored));
    }

    #[test]
    fn test_handle_url_rejects_opaque_origin() {
        let (mut manager, _temp) = setup(&[]);
        let mediator = PermissionMediator::new(ScriptedPrompt::new(&[PromptAnswer::AlwaysAllow]));

        let verdict = mediator
            .handle_url(&mut manager, "file:///tmp/page.html", "notifications")
            .unwrap();

        assert_eq!(verdict, Verdict::Denied(VerdictSource::Rejected));
        assert_eq!(verdict.source(), VerdictSource::Rejected);
        assert_eq!(mediator.prompt().calls.get(), 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_from_url_keeps_page_url() {
        let request = PermissionRequest::from_url("https://a.example/x", "media").unwrap();
        assert_eq!(request.origin, "https://a.example");
        assert_eq!(request.url.as_deref(), Some("https://a.example/x"));
    }
}
