//! Reconcile requests and outcomes exchanged with the scheduler

use crate::{CoreError, Result};
use config_api::ConfigClient;
use kube_runtime::controller::Action;
use std::fmt;
use std::time::Duration;

/// Identity of the ConfigClient to reconcile
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Request {
    pub namespace: String,
    pub name: String,
}

impl Request {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build the request key for a ConfigClient delivered by a watch
    pub fn for_object(client: &ConfigClient) -> Result<Self> {
        let name = client.metadata.name.as_deref().ok_or_else(|| {
            CoreError::InvariantViolation("ConfigClient has no name".to_string())
        })?;
        let namespace = client.metadata.namespace.as_deref().ok_or_else(|| {
            CoreError::InvariantViolation(format!("ConfigClient {} has no namespace", name))
        })?;
        Ok(Self::new(namespace, name))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What the scheduler should do with a request once reconcile returns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reconcile again as soon as possible
    Requeue,
    /// Reconcile again after the given delay
    RequeueAfter(Duration),
    /// Nothing to do until the watched state changes
    Done,
}

impl Outcome {
    pub fn requeue(&self) -> bool {
        !matches!(self, Outcome::Done)
    }

    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            Outcome::Requeue => Some(Duration::ZERO),
            Outcome::RequeueAfter(delay) => Some(*delay),
            Outcome::Done => None,
        }
    }
}

impl From<Outcome> for Action {
    fn from(outcome: Outcome) -> Self {
        match outcome.requeue_after() {
            Some(delay) => Action::requeue(delay),
            None => Action::await_change(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_api::ConfigClientSpec;

    #[test]
    fn test_request_display() {
        let request = Request::new("apps", "demo");
        assert_eq!(request.to_string(), "apps/demo");
    }

    #[test]
    fn test_request_for_object() {
        let mut client = ConfigClient::new("demo", ConfigClientSpec::default());
        client.metadata.namespace = Some("apps".to_string());

        let request = Request::for_object(&client).unwrap();
        assert_eq!(request, Request::new("apps", "demo"));
    }

    #[test]
    fn test_request_for_object_without_namespace() {
        let client = ConfigClient::new("demo", ConfigClientSpec::default());
        let err = Request::for_object(&client).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation(_)));
    }

    #[test]
    fn test_outcome_requeue_signal() {
        assert!(!Outcome::Done.requeue());
        assert_eq!(Outcome::Done.requeue_after(), None);

        assert!(Outcome::Requeue.requeue());
        assert_eq!(Outcome::Requeue.requeue_after(), Some(Duration::ZERO));

        let later = Outcome::RequeueAfter(Duration::from_secs(60));
        assert!(later.requeue());
        assert_eq!(later.requeue_after(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_outcome_into_action() {
        assert_eq!(Action::from(Outcome::Done), Action::await_change());
        assert_eq!(
            Action::from(Outcome::RequeueAfter(Duration::from_secs(60))),
            Action::requeue(Duration::from_secs(60))
        );
        assert_eq!(
            Action::from(Outcome::Requeue),
            Action::requeue(Duration::ZERO)
        );
    }
}
