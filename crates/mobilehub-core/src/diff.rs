//! Three-way diff marks.
//!
//! Comparison never mutates the compared entities; each pairing comes back
//! as a [`Diffed`] value that owns clones of both sides.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMark {
    Create,
    Update,
    None,
    Delete,
}

impl DiffMark {
    pub fn is_actionable(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for DiffMark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::None => "none",
            Self::Delete => "delete",
        };
        f.pad(s)
    }
}

/// One entity after comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Diffed<T> {
    /// Present in dev only.
    Create(T),
    /// Matched, and differs on a provider-input field.
    Update { dev: T, current: T },
    /// Matched and equal.
    Unchanged { dev: T, current: T },
    /// Present in current only.
    Delete(T),
}

impl<T> Diffed<T> {
    pub fn mark(&self) -> DiffMark {
        match self {
            Self::Create(_) => DiffMark::Create,
            Self::Update { .. } => DiffMark::Update,
            Self::Unchanged { .. } => DiffMark::None,
            Self::Delete(_) => DiffMark::Delete,
        }
    }

    /// The retained side: dev for everything but deletes.
    pub fn entity(&self) -> &T {
        match self {
            Self::Create(dev) | Self::Update { dev, .. } | Self::Unchanged { dev, .. } => dev,
            Self::Delete(current) => current,
        }
    }

    pub fn entity_mut(&mut self) -> &mut T {
        match self {
            Self::Create(dev) | Self::Update { dev, .. } | Self::Unchanged { dev, .. } => dev,
            Self::Delete(current) => current,
        }
    }

    pub fn current(&self) -> Option<&T> {
        match self {
            Self::Update { current, .. } | Self::Unchanged { current, .. } | Self::Delete(current) => {
                Some(current)
            }
            Self::Create(_) => None,
        }
    }
}

/// Pair every dev entity with at most one current entity and mark it.
///
/// `find` locates the dev entity's counterpart in `current`; a candidate that
/// was already claimed by an earlier dev entity counts as no match. Current
/// entities left unclaimed come back as deletes, after all dev entities.
pub fn reconcile<T, F, S>(dev: &[T], current: &[T], find: F, same: S) -> Vec<Diffed<T>>
where
    T: Clone,
    F: Fn(&T, &[T]) -> Option<usize>,
    S: Fn(&T, &T) -> bool,
{
    let mut claimed = vec![false; current.len()];
    let mut out = Vec::with_capacity(dev.len() + current.len());

    for d in dev {
        let matched = find(d, current).filter(|&i| i < current.len() && !claimed[i]);
        let entry = match matched {
            Some(i) => {
                claimed[i] = true;
                let c = &current[i];
                if same(d, c) {
                    Diffed::Unchanged {
                        dev: d.clone(),
                        current: c.clone(),
                    }
                } else {
                    Diffed::Update {
                        dev: d.clone(),
                        current: c.clone(),
                    }
                }
            }
            None => Diffed::Create(d.clone()),
        };
        out.push(entry);
    }

    for (c, taken) in current.iter().zip(&claimed) {
        if !taken {
            out.push(Diffed::Delete(c.clone()));
        }
    }

    out
}

/// Drop unchanged pairings.
pub fn actionable<T>(diffed: Vec<Diffed<T>>) -> Vec<Diffed<T>> {
    diffed
        .into_iter()
        .filter(|d| d.mark().is_actionable())
        .collect()
}
