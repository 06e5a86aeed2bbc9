use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::Rpl;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Effect {
    Read(Rpl),
    Write(Rpl),
    /// An effect parameter of a class or method.
    Variable(SmolStr),
}

impl Effect {
    /// Whether `other` covers this effect (a write covers a read of the same region).
    pub fn is_covered_by(&self, other: &Effect) -> bool {
        match (self, other) {
            (Effect::Read(r), Effect::Read(o) | Effect::Write(o)) => r.is_included_in(o),
            (Effect::Write(r), Effect::Write(o)) => r.is_included_in(o),
            (Effect::Variable(a), Effect::Variable(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Read(rpl) => write!(f, "reads {rpl}"),
            Effect::Write(rpl) => write!(f, "writes {rpl}"),
            Effect::Variable(name) => write!(f, "effect {name}"),
        }
    }
}

/// A read/write summary: an ordered set of [`Effect`]s. The empty set is `pure`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Effects {
    set: BTreeSet<Effect>,
}

impl Effects {
    pub fn pure() -> Self {
        Self::default()
    }

    pub fn single(effect: Effect) -> Self {
        let mut set = BTreeSet::new();
        set.insert(effect);
        Self { set }
    }

    pub fn variable(name: impl Into<SmolStr>) -> Self {
        Self::single(Effect::Variable(name.into()))
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.set.insert(effect);
        self
    }

    pub fn union(&self, other: &Effects) -> Effects {
        Effects {
            set: self.set.union(&other.set).cloned().collect(),
        }
    }

    pub fn is_pure(&self) -> bool {
        self.set.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.set.iter()
    }

    /// Every effect in `self` is covered by some effect in `other`.
    pub fn is_subeffect_of(&self, other: &Effects) -> bool {
        self.set
            .iter()
            .all(|effect| other.set.iter().any(|o| effect.is_covered_by(o)))
    }

    pub fn subst_rpl(&self, from: &[Rpl], to: &[Rpl]) -> Effects {
        let set = self
            .set
            .iter()
            .map(|effect| match effect {
                Effect::Read(rpl) => Effect::Read(rpl.subst(from, to)),
                Effect::Write(rpl) => Effect::Write(rpl.subst(from, to)),
                Effect::Variable(name) => Effect::Variable(name.clone()),
            })
            .collect();
        Effects { set }
    }

    /// Replace the effect parameter `name` with the summary `replacement`.
    pub fn subst_effect_var(&self, name: &str, replacement: &Effects) -> Effects {
        let mut set = BTreeSet::new();
        for effect in &self.set {
            match effect {
                Effect::Variable(v) if v == name => set.extend(replacement.set.iter().cloned()),
                other => {
                    set.insert(other.clone());
                }
            }
        }
        Effects { set }
    }
}

impl FromIterator<Effect> for Effects {
    fn from_iter<I: IntoIterator<Item = Effect>>(iter: I) -> Self {
        Effects {
            set: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set.is_empty() {
            return f.write_str("pure");
        }
        for (idx, effect) in self.set.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{effect}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Effects({self})")
    }
}
