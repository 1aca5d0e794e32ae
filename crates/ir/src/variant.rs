//! Optimized code variants and their combination.

use serde::{Deserialize, Serialize};

/// One realization of a source span.
///
/// `choices` records which tunable alternative produced `code`; it is empty
/// for code that involved no tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub code: String,
    pub choices: Vec<usize>,
}

impl Variant {
    pub fn new<C: Into<String>>(code: C, choices: Vec<usize>) -> Self {
        Self {
            code: code.into(),
            choices,
        }
    }

    /// A variant with no parameter-choice metadata.
    pub fn plain<C: Into<String>>(code: C) -> Self {
        Self::new(code, Vec::new())
    }
}

/// Mutually exclusive realizations of the same source span, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantSeq(Vec<Variant>);

impl VariantSeq {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self(variants)
    }

    pub fn single(variant: Variant) -> Self {
        Self(vec![variant])
    }

    /// Neutral element of [`VariantSeq::product`]: one empty variant.
    pub fn unit() -> Self {
        Self::single(Variant::plain(""))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Variant] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Variant> {
        self.0
    }

    /// The only variant, if the sequence holds exactly one.
    pub fn into_single(self) -> Option<Variant> {
        let mut variants = self.0;
        if variants.len() == 1 {
            variants.pop()
        } else {
            None
        }
    }

    /// Cartesian product with the sequence of the next fragment.
    ///
    /// The outer loop runs over `self` and the inner loop over `next`, so
    /// `[a, b] x [c, d]` yields `[ac, ad, bc, bd]`.
    pub fn product(&self, next: &VariantSeq) -> VariantSeq {
        let mut combined = Vec::with_capacity(self.len() * next.len());
        for head in &self.0 {
            for tail in &next.0 {
                let mut code = String::with_capacity(head.code.len() + tail.code.len());
                code.push_str(&head.code);
                code.push_str(&tail.code);
                let mut choices = Vec::with_capacity(head.choices.len() + tail.choices.len());
                choices.extend_from_slice(&head.choices);
                choices.extend_from_slice(&tail.choices);
                combined.push(Variant { code, choices });
            }
        }
        VariantSeq(combined)
    }

    /// Surround every variant's code with `prefix` and `suffix`.
    pub fn wrap(self, prefix: &str, suffix: &str) -> VariantSeq {
        VariantSeq(
            self.0
                .into_iter()
                .map(|variant| Variant {
                    code: format!("{}{}{}", prefix, variant.code, suffix),
                    choices: variant.choices,
                })
                .collect(),
        )
    }
}

impl From<Vec<Variant>> for VariantSeq {
    fn from(variants: Vec<Variant>) -> Self {
        Self(variants)
    }
}

impl IntoIterator for VariantSeq {
    type Item = Variant;
    type IntoIter = std::vec::IntoIter<Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariantSeq {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
