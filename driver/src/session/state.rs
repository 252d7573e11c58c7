use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Spawned,
    InitSent,
    InitConfirmed,
    PerftSent,
    PerftConfirmed,
    Captured,
    Extracted,
    Done,
    Failed,
}

impl SessionState {
    /// The state a successful step moves to. `Done` and `Failed` are
    /// terminal.
    pub fn next(&self) -> Option<SessionState> {
        match self {
            SessionState::Spawned => Some(SessionState::InitSent),
            SessionState::InitSent => Some(SessionState::InitConfirmed),
            SessionState::InitConfirmed => Some(SessionState::PerftSent),
            SessionState::PerftSent => Some(SessionState::PerftConfirmed),
            SessionState::PerftConfirmed => Some(SessionState::Captured),
            SessionState::Captured => Some(SessionState::Extracted),
            SessionState::Extracted => Some(SessionState::Done),
            SessionState::Done | SessionState::Failed => None,
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Spawned => "SPAWNED",
            SessionState::InitSent => "INIT_SENT",
            SessionState::InitConfirmed => "INIT_CONFIRMED",
            SessionState::PerftSent => "PERFT_SENT",
            SessionState::PerftConfirmed => "PERFT_CONFIRMED",
            SessionState::Captured => "CAPTURED",
            SessionState::Extracted => "EXTRACTED",
            SessionState::Done => "DONE",
            SessionState::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState;

    #[test]
    fn walks_to_done() {
        let mut state = SessionState::Spawned;
        let mut steps = 0;
        while let Some(next) = state.next() {
            state = next;
            steps += 1;
        }

        assert!(state == SessionState::Done);
        assert!(steps == 7);
        assert!(SessionState::Failed.next().is_none());
    }
}
