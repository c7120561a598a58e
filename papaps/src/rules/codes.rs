//! Codes de classification : arahan (A1..A6), kewajiban (K1..K3), ruang

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::Serialize;

/// Code d'un alphabet fixe, représenté par un bit
pub trait Code: Copy + Eq + Ord + Hash + fmt::Display + 'static {
    /// Tous les codes de l'alphabet, dans l'ordre de tri
    const ALL: &'static [Self];

    fn bit(self) -> u8;
}

/// Directive d'usage du sol (arahan)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
}

impl Code for Directive {
    const ALL: &'static [Self] = &[Self::A1, Self::A2, Self::A3, Self::A4, Self::A5, Self::A6];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", *self as u8 + 1)
    }
}

/// Obligation (kewajiban)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Obligation {
    K1,
    K2,
    K3,
}

impl Code for Obligation {
    const ALL: &'static [Self] = &[Self::K1, Self::K2, Self::K3];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", *self as u8 + 1)
    }
}

/// Catégorie spatiale (ruang)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Protection,
    Utilization,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Protection => "Protection",
            Self::Utilization => "Utilization",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ensemble de codes, sans doublon, toujours parcouru trié
///
/// `Display` produit la concaténation triée (`"A1A2A4"`, `""` si vide).
pub struct CodeSet<C> {
    bits: u8,
    _code: PhantomData<C>,
}

pub type DirectiveSet = CodeSet<Directive>;
pub type ObligationSet = CodeSet<Obligation>;

impl<C: Code> CodeSet<C> {
    pub fn empty() -> Self {
        Self::from_bits(0)
    }

    pub fn of(codes: &[C]) -> Self {
        Self::from_bits(codes.iter().fold(0, |bits, c| bits | c.bit()))
    }

    fn from_bits(bits: u8) -> Self {
        Self {
            bits,
            _code: PhantomData,
        }
    }

    pub fn insert(&mut self, code: C) {
        self.bits |= code.bit();
    }

    pub fn contains(&self, code: C) -> bool {
        self.bits & code.bit() != 0
    }

    /// Intersection avec un autre ensemble
    pub fn retain(self, allowed: &[C]) -> Self {
        Self::from_bits(self.bits & Self::of(allowed).bits)
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Codes dans l'ordre de tri
    pub fn iter(&self) -> impl Iterator<Item = C> + '_ {
        C::ALL.iter().copied().filter(|c| self.contains(*c))
    }
}

impl<C: Code> Default for CodeSet<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> Clone for CodeSet<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CodeSet<C> {}

impl<C> PartialEq for CodeSet<C> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<C> Eq for CodeSet<C> {}

impl<C> Hash for CodeSet<C> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

/// Ordre lexicographique des concaténations
impl<C: Code> Ord for CodeSet<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<C: Code> PartialOrd for CodeSet<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Code> fmt::Display for CodeSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in self.iter() {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

impl<C: Code> fmt::Debug for CodeSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl<C: Code> Serialize for CodeSet<C> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Directive::*;

    #[test]
    fn test_display_is_sorted() {
        let set = DirectiveSet::of(&[A4, A1, A2]);
        assert_eq!(set.to_string(), "A1A2A4");
        assert_eq!(ObligationSet::of(&[Obligation::K3, Obligation::K2]).to_string(), "K2K3");
        assert_eq!(ObligationSet::empty().to_string(), "");
    }

    #[test]
    fn test_no_duplicates() {
        let mut set = DirectiveSet::of(&[A2, A2]);
        set.insert(A2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_retain() {
        let set = DirectiveSet::of(&[A1, A2, A3, A4, A5]).retain(&[A2, A4]);
        assert_eq!(set.to_string(), "A2A4");
        assert!(DirectiveSet::of(&[A6]).retain(&[A1, A2]).is_empty());
    }

    #[test]
    fn test_order_follows_concatenation() {
        let a = DirectiveSet::of(&[A1, A2, A4]);
        let b = DirectiveSet::of(&[A1, A3]);
        let c = DirectiveSet::of(&[A1, A2]);
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
    }
}
