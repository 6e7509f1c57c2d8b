//! Personality trait space: five named dimensions in [0, 1].
//!
//! A [`TraitVector`] is a complete point in the space; a [`TraitOverride`]
//! is a partial one used either as a hard persona override or as a
//! situational tone modifier.

use serde::{Deserialize, Serialize};

// ============================================================================
// Dimensions
// ============================================================================

/// The five personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitDimension {
    Enthusiasm,
    Empathy,
    Professionalism,
    Humor,
    Directness,
}

impl TraitDimension {
    /// All dimensions in canonical order.
    pub const ALL: [TraitDimension; 5] = [
        Self::Enthusiasm,
        Self::Empathy,
        Self::Professionalism,
        Self::Humor,
        Self::Directness,
    ];

    /// Snake-case name used in catalogs and JSON payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enthusiasm => "enthusiasm",
            Self::Empathy => "empathy",
            Self::Professionalism => "professionalism",
            Self::Humor => "humor",
            Self::Directness => "directness",
        }
    }
}

/// Clamp into [0, 1]; non-finite values collapse to 0.0.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ============================================================================
// TraitVector
// ============================================================================

/// A complete, immutable personality vector.
///
/// Fields are private so every vector the crate hands out stays inside the
/// unit interval. New vectors come from [`TraitVector::new`], [`TraitVector::with`]
/// or blending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    enthusiasm: f32,
    empathy: f32,
    professionalism: f32,
    humor: f32,
    directness: f32,
}

impl TraitVector {
    /// Build a vector, clamping each value into [0, 1].
    pub fn new(
        enthusiasm: f32,
        empathy: f32,
        professionalism: f32,
        humor: f32,
        directness: f32,
    ) -> Self {
        Self {
            enthusiasm: clamp_unit(enthusiasm),
            empathy: clamp_unit(empathy),
            professionalism: clamp_unit(professionalism),
            humor: clamp_unit(humor),
            directness: clamp_unit(directness),
        }
    }

    /// Neutral midpoint on every dimension.
    pub fn neutral() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5, 0.5)
    }

    pub fn enthusiasm(&self) -> f32 {
        self.enthusiasm
    }

    pub fn empathy(&self) -> f32 {
        self.empathy
    }

    pub fn professionalism(&self) -> f32 {
        self.professionalism
    }

    pub fn humor(&self) -> f32 {
        self.humor
    }

    pub fn directness(&self) -> f32 {
        self.directness
    }

    /// Value of a single dimension.
    pub fn get(&self, dim: TraitDimension) -> f32 {
        match dim {
            TraitDimension::Enthusiasm => self.enthusiasm,
            TraitDimension::Empathy => self.empathy,
            TraitDimension::Professionalism => self.professionalism,
            TraitDimension::Humor => self.humor,
            TraitDimension::Directness => self.directness,
        }
    }

    /// Copy of this vector with one dimension replaced (clamped).
    pub fn with(&self, dim: TraitDimension, value: f32) -> Self {
        let mut next = *self;
        let value = clamp_unit(value);
        match dim {
            TraitDimension::Enthusiasm => next.enthusiasm = value,
            TraitDimension::Empathy => next.empathy = value,
            TraitDimension::Professionalism => next.professionalism = value,
            TraitDimension::Humor => next.humor = value,
            TraitDimension::Directness => next.directness = value,
        }
        next
    }

    /// `(dimension, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitDimension, f32)> + '_ {
        TraitDimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Copy with every dimension clamped into [0, 1].
    pub fn clamped(&self) -> Self {
        Self::new(
            self.enthusiasm,
            self.empathy,
            self.professionalism,
            self.humor,
            self.directness,
        )
    }

    /// Dimensions whose raw value lies outside [0, 1] or is not finite.
    ///
    /// Only deserialized vectors can fail this; the constructors clamp.
    pub fn out_of_range(&self) -> Vec<TraitDimension> {
        self.iter()
            .filter(|(_, v)| !v.is_finite() || *v < 0.0 || *v > 1.0)
            .map(|(d, _)| d)
            .collect()
    }
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::neutral()
    }
}

// ============================================================================
// TraitOverride
// ============================================================================

/// A partial trait vector. Absent fields leave the target dimension alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enthusiasm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empathy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professionalism: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humor: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directness: Option<f32>,
}

impl TraitOverride {
    /// Override touching no dimension.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn set(mut self, dim: TraitDimension, value: f32) -> Self {
        let slot = match dim {
            TraitDimension::Enthusiasm => &mut self.enthusiasm,
            TraitDimension::Empathy => &mut self.empathy,
            TraitDimension::Professionalism => &mut self.professionalism,
            TraitDimension::Humor => &mut self.humor,
            TraitDimension::Directness => &mut self.directness,
        };
        *slot = Some(value);
        self
    }

    pub fn get(&self, dim: TraitDimension) -> Option<f32> {
        match dim {
            TraitDimension::Enthusiasm => self.enthusiasm,
            TraitDimension::Empathy => self.empathy,
            TraitDimension::Professionalism => self.professionalism,
            TraitDimension::Humor => self.humor,
            TraitDimension::Directness => self.directness,
        }
    }

    /// Present `(dimension, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitDimension, f32)> + '_ {
        TraitDimension::ALL
            .into_iter()
            .filter_map(move |d| self.get(d).map(|v| (d, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Present dimensions whose value lies outside [0, 1] or is not finite.
    pub fn out_of_range(&self) -> Vec<TraitDimension> {
        self.iter()
            .filter(|(_, v)| !v.is_finite() || *v < 0.0 || *v > 1.0)
            .map(|(d, _)| d)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_values() {
        let v = TraitVector::new(1.4, -0.2, f32::NAN, 0.3, 1.0);
        assert_eq!(v.enthusiasm(), 1.0);
        assert_eq!(v.empathy(), 0.0);
        assert_eq!(v.professionalism(), 0.0);
        assert_eq!(v.humor(), 0.3);
        assert!(v.out_of_range().is_empty());
    }

    #[test]
    fn test_with_returns_new_vector() {
        let base = TraitVector::neutral();
        let next = base.with(TraitDimension::Humor, 0.9);
        assert_eq!(base.humor(), 0.5);
        assert_eq!(next.humor(), 0.9);
        assert_eq!(next.empathy(), 0.5);
    }

    #[test]
    fn test_override_iter_only_present_dimensions() {
        let o = TraitOverride::empty()
            .set(TraitDimension::Directness, 0.8)
            .set(TraitDimension::Enthusiasm, 0.2);
        let dims: Vec<_> = o.iter().map(|(d, _)| d).collect();
        assert_eq!(dims, vec![TraitDimension::Enthusiasm, TraitDimension::Directness]);
        assert!(!o.is_empty());
        assert!(TraitOverride::empty().is_empty());
    }

    #[test]
    fn test_override_rejects_unknown_dimension_names() {
        let err = serde_json::from_str::<TraitOverride>(r#"{"sarcasm": 0.9}"#);
        assert!(err.is_err());
        let ok: TraitOverride = serde_json::from_str(r#"{"humor": 0.9}"#).unwrap();
        assert_eq!(ok.humor, Some(0.9));
    }

    #[test]
    fn test_deserialized_vector_reports_out_of_range() {
        let v: TraitVector = serde_json::from_str(
            r#"{"enthusiasm":1.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":-1}"#,
        )
        .unwrap();
        assert_eq!(
            v.out_of_range(),
            vec![TraitDimension::Enthusiasm, TraitDimension::Directness]
        );
    }

    #[test]
    fn test_dimension_names_are_snake_case() {
        for dim in TraitDimension::ALL {
            let json = serde_json::to_string(&dim).unwrap();
            assert_eq!(json, format!("\"{}\"", dim.name()));
        }
    }
}
