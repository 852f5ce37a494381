//! The four stability factors and a fixed-shape per-factor container.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Sleep,
    Activity,
    Focus,
    Social,
}

impl Factor {
    pub const ALL: [Factor; 4] = [
        Factor::Sleep,
        Factor::Activity,
        Factor::Focus,
        Factor::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Factor::Sleep => "sleep",
            Factor::Activity => "activity",
            Factor::Focus => "focus",
            Factor::Social => "social",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `T` per factor. Serializes as `{"sleep": .., "activity": .., "focus": .., "social": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerFactor<T> {
    pub sleep: T,
    pub activity: T,
    pub focus: T,
    pub social: T,
}

impl<T> PerFactor<T> {
    pub fn from_fn(mut f: impl FnMut(Factor) -> T) -> Self {
        Self {
            sleep: f(Factor::Sleep),
            activity: f(Factor::Activity),
            focus: f(Factor::Focus),
            social: f(Factor::Social),
        }
    }

    pub fn get(&self, factor: Factor) -> &T {
        match factor {
            Factor::Sleep => &self.sleep,
            Factor::Activity => &self.activity,
            Factor::Focus => &self.focus,
            Factor::Social => &self.social,
        }
    }

    pub fn get_mut(&mut self, factor: Factor) -> &mut T {
        match factor {
            Factor::Sleep => &mut self.sleep,
            Factor::Activity => &mut self.activity,
            Factor::Focus => &mut self.focus,
            Factor::Social => &mut self.social,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Factor, &T) -> U) -> PerFactor<U> {
        PerFactor::from_fn(|factor| f(factor, self.get(factor)))
    }

    /// Iterate in `Factor::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, &T)> + '_ {
        Factor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}
