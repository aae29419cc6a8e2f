/// Token identifying one transition; completions carrying an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState<T> {
    Idle,
    Transitioning { ticket: Ticket, target: T },
}

/// Exclusive lock guarding one category of transition.
#[derive(Debug)]
pub(crate) struct TransitionLock<T> {
    state: LockState<T>,
    issued: u64,
}

impl<T: Copy> TransitionLock<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: LockState::Idle,
            issued: 0,
        }
    }

    pub(crate) fn state(&self) -> LockState<T> {
        self.state
    }

    pub(crate) fn is_busy(&self) -> bool {
        matches!(self.state, LockState::Transitioning { .. })
    }

    /// Idle → Transitioning. Returns `None` while another transition holds the lock.
    pub(crate) fn begin(&mut self, target: T) -> Option<Ticket> {
        if self.is_busy() {
            return None;
        }
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.state = LockState::Transitioning { ticket, target };
        Some(ticket)
    }

    /// Transitioning → Idle for the matching ticket, yielding the transition's target.
    pub(crate) fn finish(&mut self, ticket: Ticket) -> Option<T> {
        match self.state {
            LockState::Transitioning {
                ticket: held,
                target,
            } if held == ticket => {
                self.state = LockState::Idle;
                Some(target)
            }
            _ => None,
        }
    }

    /// Drop any in-flight transition without completing it.
    pub(crate) fn abandon(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, LockState::Idle) {
            LockState::Transitioning { target, .. } => Some(target),
            LockState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_finish() {
        let mut lock = TransitionLock::new();
        let ticket = lock.begin(3usize).unwrap();
        assert!(lock.begin(4).is_none());
        assert_eq!(lock.finish(ticket), Some(3));
        assert!(!lock.is_busy());
        assert!(lock.begin(4).is_some());
    }

    #[test]
    fn stale_ticket_does_not_release() {
        let mut lock = TransitionLock::new();
        let stale = lock.begin(1usize).unwrap();
        assert_eq!(lock.abandon(), Some(1));
        let fresh = lock.begin(2).unwrap();
        assert_eq!(lock.finish(stale), None);
        assert!(lock.is_busy());
        assert_eq!(lock.finish(fresh), Some(2));
    }
}
