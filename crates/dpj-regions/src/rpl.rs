use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One segment of a region path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RplElement {
    /// The distinguished top-level region.
    Root,
    /// Any sequence of regions below the preceding prefix.
    Star,
    /// A declared region name (`region A;`).
    Name(SmolStr),
    /// A formal region parameter of a class or method.
    Param(SmolStr),
    /// A final local variable used as a region (`v:R`).
    Var(SmolStr),
    /// An array index element (`[i]`).
    Index(SmolStr),
}

impl fmt::Display for RplElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RplElement::Root => f.write_str("Root"),
            RplElement::Star => f.write_str("*"),
            RplElement::Name(name) | RplElement::Param(name) | RplElement::Var(name) => {
                f.write_str(name)
            }
            RplElement::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A region path list: a colon-separated path such as `Root:A:*`.
///
/// An `Rpl` is never empty; the single-element path `[Root]` is the canonical root region and
/// is what every omitted region argument defaults to.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rpl {
    elements: Vec<RplElement>,
}

impl Rpl {
    pub fn root() -> Self {
        Self {
            elements: vec![RplElement::Root],
        }
    }

    /// Build a path from its elements. Returns `None` for an empty element list.
    pub fn from_elements(elements: Vec<RplElement>) -> Option<Self> {
        if elements.is_empty() {
            return None;
        }
        Some(Self { elements })
    }

    /// The path consisting of just the region parameter `name`.
    pub fn param(name: impl Into<SmolStr>) -> Self {
        Self {
            elements: vec![RplElement::Param(name.into())],
        }
    }

    /// `Root:name`.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self::root().child(RplElement::Name(name.into()))
    }

    pub fn child(&self, element: RplElement) -> Self {
        let mut elements = self.elements.clone();
        elements.push(element);
        Self { elements }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.elements.len() <= 1 {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    pub fn elements(&self) -> &[RplElement] {
        &self.elements
    }

    pub fn is_root(&self) -> bool {
        matches!(self.elements.as_slice(), [RplElement::Root])
    }

    /// The region parameter this path starts with, if any.
    pub fn leading_param(&self) -> Option<&str> {
        match self.elements.first() {
            Some(RplElement::Param(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Replace a leading occurrence of the region parameter `param` with `replacement`.
    pub fn subst_param(&self, param: &str, replacement: &Rpl) -> Rpl {
        if self.leading_param() != Some(param) {
            return self.clone();
        }
        let mut elements = replacement.elements.clone();
        elements.extend(self.elements[1..].iter().cloned());
        Rpl { elements }
    }

    /// Simultaneous substitution of parameter paths `from` by `to`.
    ///
    /// Entries of `from` that are not single-parameter paths are ignored, as are entries without
    /// a counterpart in `to`.
    pub fn subst(&self, from: &[Rpl], to: &[Rpl]) -> Rpl {
        let Some(param) = self.leading_param() else {
            return self.clone();
        };
        for (formal, actual) in from.iter().zip(to) {
            if formal.elements.len() == 1 && formal.leading_param() == Some(param) {
                return self.subst_param(param, actual);
            }
        }
        self.clone()
    }

    /// Region nesting: `Root:A:B` is included in `Root:A:*` and in itself.
    pub fn is_included_in(&self, other: &Rpl) -> bool {
        match other.elements.split_last() {
            Some((RplElement::Star, prefix)) => {
                self.elements.len() >= prefix.len() && self.elements[..prefix.len()] == *prefix
            }
            _ => self == other,
        }
    }
}

impl Default for Rpl {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Rpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, element) in self.elements.iter().enumerate() {
            if idx > 0 {
                f.write_str(":")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rpl({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_default() {
        assert!(Rpl::default().is_root());
        assert_eq!(Rpl::root().to_string(), "Root");
        assert!(!Rpl::named("A").is_root());
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(Rpl::from_elements(Vec::new()), None);
    }

    #[test]
    fn star_includes_children_and_itself_prefix() {
        let a = Rpl::named("A");
        let a_star = a.child(RplElement::Star);
        let a_b = a.child(RplElement::Name("B".into()));
        assert!(a_b.is_included_in(&a_star));
        assert!(a.is_included_in(&a_star));
        assert!(!Rpl::named("C").is_included_in(&a_star));
        assert!(a_b.is_included_in(&a_b));
    }
}
