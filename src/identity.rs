//! Session identity plumbing so gated flows react to sign-in changes.
//!
//! The auth collaborator holds a [`SessionFeed`] and pushes sign-in/out
//! events; the session loop owns the matching [`SessionWatch`] and drains it
//! once per tick, re-evaluating gating on every observed transition.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

/// Opaque user identity supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single identity transition pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserId),
    SignedOut,
}

/// Net effect of draining pending identity events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(UserId),
    SignedOut,
}

/// Producer half held by the auth collaborator.
#[derive(Debug, Clone)]
pub struct SessionFeed {
    tx: Sender<SessionEvent>,
}

impl SessionFeed {
    pub fn signed_in(&self, user: UserId) {
        let _ = self.tx.send(SessionEvent::SignedIn(user));
    }

    pub fn signed_out(&self) {
        let _ = self.tx.send(SessionEvent::SignedOut);
    }
}

/// Consumer half owned by the session loop.
#[derive(Debug)]
pub struct SessionWatch {
    rx: Receiver<SessionEvent>,
    current: Option<UserId>,
}

impl SessionWatch {
    /// Build a connected feed/watch pair seeded with the initial identity.
    #[must_use]
    pub fn channel(initial: Option<UserId>) -> (SessionFeed, SessionWatch) {
        let (tx, rx) = unbounded();
        (SessionFeed { tx }, SessionWatch { rx, current: initial })
    }

    #[must_use]
    pub fn current(&self) -> Option<&UserId> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// Apply all queued identity events and report the net transition, if any.
    ///
    /// Events are coalesced: a sign-out followed by a sign-in within one tick
    /// reports only the final signed-in state. Returns `None` when the
    /// effective identity did not change.
    pub fn drain(&mut self) -> Option<SessionChange> {
        let before = self.current.clone();
        loop {
            match self.rx.try_recv() {
                Ok(SessionEvent::SignedIn(user)) => self.current = Some(user),
                Ok(SessionEvent::SignedOut) => self.current = None,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if self.current == before {
            return None;
        }
        match &self.current {
            Some(user) => Some(SessionChange::SignedIn(user.clone())),
            None => Some(SessionChange::SignedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_seeded_identity() {
        let (_feed, watch) = SessionWatch::channel(Some(UserId::from("u-1")));
        assert!(watch.is_signed_in());
        assert_eq!(watch.current().map(UserId::as_str), Some("u-1"));
    }

    #[test]
    fn drain_reports_sign_out() {
        let (feed, mut watch) = SessionWatch::channel(Some(UserId::from("u-1")));
        feed.signed_out();
        assert_eq!(watch.drain(), Some(SessionChange::SignedOut));
        assert!(!watch.is_signed_in());
    }

    #[test]
    fn drain_reports_sign_in() {
        let (feed, mut watch) = SessionWatch::channel(None);
        feed.signed_in(UserId::from("u-2"));
        assert_eq!(
            watch.drain(),
            Some(SessionChange::SignedIn(UserId::from("u-2")))
        );
    }

    #[test]
    fn drain_coalesces_to_net_transition() {
        let (feed, mut watch) = SessionWatch::channel(Some(UserId::from("u-1")));
        feed.signed_out();
        feed.signed_in(UserId::from("u-1"));
        // Net identity is unchanged, so no transition is reported.
        assert_eq!(watch.drain(), None);
        assert!(watch.is_signed_in());
    }

    #[test]
    fn drain_without_events_is_none() {
        let (_feed, mut watch) = SessionWatch::channel(None);
        assert_eq!(watch.drain(), None);
    }

    #[test]
    fn drain_survives_disconnected_feed() {
        let (feed, mut watch) = SessionWatch::channel(Some(UserId::from("u-1")));
        feed.signed_out();
        drop(feed);
        assert_eq!(watch.drain(), Some(SessionChange::SignedOut));
        assert_eq!(watch.drain(), None);
    }
}
