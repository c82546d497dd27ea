/// Unlocks chat and report once the backend has ingested a document set.
///
/// Starts closed. Only the upload-success transition opens it and nothing
/// closes it again for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessGate {
    open: bool,
}

impl ReadinessGate {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
    }
}
