/// Administrator reset dialog.
///
/// `Closed -> AwaitingCode -> Verifying -> Closed` on success, or back to
/// `AwaitingCode` with an error. The same error text is shown whether the
/// code was wrong or the clear itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResetFlow {
    #[default]
    Closed,
    AwaitingCode {
        input: String,
        error: Option<String>,
    },
    Verifying,
}

impl ResetFlow {
    pub fn is_open(&self) -> bool {
        !matches!(self, ResetFlow::Closed)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResetFlow::AwaitingCode { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Submit is only possible with a non-blank code and no request pending.
    pub fn can_submit(&self) -> bool {
        matches!(self, ResetFlow::AwaitingCode { input, .. } if !input.trim().is_empty())
    }
}

/// Holds the dialog in `Verifying` while a reset request is in flight.
///
/// If the request future is dropped before [`VerifyingGuard::finish`], the
/// dialog goes back to `AwaitingCode` with the submitted code.
pub(crate) struct VerifyingGuard<'a> {
    flow: &'a mut ResetFlow,
    code: Option<String>,
}

impl<'a> VerifyingGuard<'a> {
    pub(crate) fn enter(flow: &'a mut ResetFlow, code: String) -> Self {
        *flow = ResetFlow::Verifying;
        Self {
            flow,
            code: Some(code),
        }
    }

    pub(crate) fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    /// The request completed; the caller decides the next state.
    pub(crate) fn finish(mut self) {
        self.code = None;
    }
}

impl Drop for VerifyingGuard<'_> {
    fn drop(&mut self) {
        if let Some(input) = self.code.take() {
            *self.flow = ResetFlow::AwaitingCode { input, error: None };
        }
    }
}

/// Result of submitting the reset dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetSubmit {
    /// Dialog not awaiting a code, or the code was blank.
    Ignored,
    Completed { cleared: u64 },
    Rejected,
}
