use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Which upstream operation a request, cache entry or plan is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Daily,
    Realtime,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Daily => "daily",
            OperationKind::Realtime => "realtime",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the provider that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ProviderId,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: ProviderId) -> Self {
        Self { value, source }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            source: self.source,
        }
    }

    pub fn into_parts(self) -> (T, ProviderId) {
        (self.value, self.source)
    }
}
