//! Array-backed eight-dimensional trait vector

use super::{Trigram, DIMENSIONS};
use crate::{Result, TripleOsError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Index, IndexMut};

/// Score per trigram dimension
///
/// All eight dimensions are always present; an absent dimension is 0.
/// Serializes as a map keyed by pinyin trigram names.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraitVector([f64; DIMENSIONS]);

impl TraitVector {
    /// All-zero vector
    pub const fn zeros() -> Self {
        Self([0.0; DIMENSIONS])
    }

    /// Build from raw values in dimension order
    pub const fn from_array(values: [f64; DIMENSIONS]) -> Self {
        Self(values)
    }

    /// Build from `(trigram, value)` pairs; unspecified dimensions are 0
    ///
    /// Repeated trigrams accumulate.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Trigram, f64)>) -> Self {
        let mut vector = Self::zeros();
        for (trigram, value) in pairs {
            vector.add(trigram, value);
        }
        vector
    }

    /// Raw values in dimension order
    pub const fn as_array(&self) -> &[f64; DIMENSIONS] {
        &self.0
    }

    /// Value of one dimension
    pub fn get(&self, trigram: Trigram) -> f64 {
        self.0[trigram.index()]
    }

    /// Add `delta` to one dimension
    pub fn add(&mut self, trigram: Trigram, delta: f64) {
        self.0[trigram.index()] += delta;
    }

    /// Iterate `(trigram, value)` in dimension order
    pub fn iter(&self) -> impl Iterator<Item = (Trigram, f64)> + '_ {
        Trigram::ALL.into_iter().map(move |t| (t, self.0[t.index()]))
    }

    /// Dot product
    pub fn dot(&self, other: &TraitVector) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// Euclidean magnitude
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// True when every dimension is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Sum of all dimensions
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// All dimensions sorted by value (highest first), with percentage shares
    ///
    /// Shares are relative to [`total`](Self::total) and rounded to one
    /// decimal; they are 0 when the total is not positive. Equal values keep
    /// dimension order.
    pub fn profile(&self) -> Vec<DimensionShare> {
        let total = self.total();
        let mut shares: Vec<DimensionShare> = self
            .iter()
            .map(|(trigram, value)| DimensionShare {
                trigram,
                value,
                percentage: if total > 0.0 {
                    (value / total * 1000.0).round() / 10.0
                } else {
                    0.0
                },
            })
            .collect();

        // Stable sort keeps dimension order for ties
        shares.sort_by(|a, b| b.value.total_cmp(&a.value));
        shares
    }

    /// The `count` strongest dimensions
    pub fn dominant(&self, count: usize) -> Vec<DimensionShare> {
        let mut profile = self.profile();
        profile.truncate(count);
        profile
    }
}

impl Index<Trigram> for TraitVector {
    type Output = f64;

    fn index(&self, trigram: Trigram) -> &f64 {
        &self.0[trigram.index()]
    }
}

impl IndexMut<Trigram> for TraitVector {
    fn index_mut(&mut self, trigram: Trigram) -> &mut f64 {
        &mut self.0[trigram.index()]
    }
}

impl From<[f64; DIMENSIONS]> for TraitVector {
    fn from(values: [f64; DIMENSIONS]) -> Self {
        Self(values)
    }
}

impl TryFrom<&[f64]> for TraitVector {
    type Error = TripleOsError;

    fn try_from(values: &[f64]) -> Result<Self> {
        let array: [f64; DIMENSIONS] =
            values
                .try_into()
                .map_err(|_| TripleOsError::InvalidVectorDimension {
                    expected: DIMENSIONS,
                    actual: values.len(),
                })?;
        Ok(Self(array))
    }
}

impl TryFrom<Vec<f64>> for TraitVector {
    type Error = TripleOsError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::try_from(values.as_slice())
    }
}

impl Serialize for TraitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DIMENSIONS))?;
        for (trigram, value) in self.iter() {
            map.serialize_entry(trigram.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TraitVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TraitVectorVisitor;

        impl<'de> Visitor<'de> for TraitVectorVisitor {
            type Value = TraitVector;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "a map from trigram dimension to number")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<TraitVector, A::Error> {
                let mut vector = TraitVector::zeros();
                let mut seen = [false; DIMENSIONS];

                while let Some((trigram, value)) = access.next_entry::<Trigram, f64>()? {
                    if seen[trigram.index()] {
                        return Err(serde::de::Error::custom(format!(
                            "dimension '{}' given more than once",
                            trigram
                        )));
                    }
                    seen[trigram.index()] = true;
                    vector[trigram] = value;
                }

                Ok(vector)
            }
        }

        deserializer.deserialize_map(TraitVectorVisitor)
    }
}

/// One dimension's value and share of the vector total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionShare {
    /// Dimension
    pub trigram: Trigram,
    /// Raw value
    pub value: f64,
    /// Share of the vector total in percent (one decimal)
    pub percentage: f64,
}
