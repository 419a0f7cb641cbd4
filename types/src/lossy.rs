//! Lossy sequence decoding.
//!
//! A [`LossyList<T>`] decodes a sequence element by element. Elements that
//! fail to decode as `T` are dropped whole and decoding carries on, so a
//! partially malformed payload still yields every element that is valid on its
//! own. The relative order of the kept elements is preserved.
//!
//! Encoding is best effort in the same spirit: an element that fails to encode
//! is left out rather than failing the whole sequence.
//!
//! ```
//! use kitbag_types::LossyList;
//!
//! let list: LossyList<u8> = serde_json::from_str(r#"[1, "two", 3, null, 5]"#).unwrap();
//! assert_eq!(list.as_slice(), &[1, 3, 5]);
//! assert_eq!(list.skipped(), 2);
//! ```
//!
//! For a plain `Vec<T>` field use the free functions with serde's field
//! attributes:
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Feed {
//!     #[serde(deserialize_with = "kitbag_types::lossy::deserialize")]
//!     items: Vec<u32>,
//! }
//!
//! let feed: Feed = serde_json::from_str(r#"{"items": [1, -1, 2]}"#).unwrap();
//! assert_eq!(feed.items, vec![1, 2]);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::{slice, vec};

use serde::de::{DeserializeOwned, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The successfully decoded elements of a sequence, plus how many were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyList<T> {
    elements: Vec<T>,
    skipped: usize,
}

impl<T> LossyList<T> {
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Number of input elements that failed to decode.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.elements
    }
}

impl<T> Default for LossyList<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> From<Vec<T>> for LossyList<T> {
    fn from(elements: Vec<T>) -> Self {
        Self {
            elements,
            skipped: 0,
        }
    }
}

impl<T> Deref for LossyList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl<T> IntoIterator for LossyList<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a LossyList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// One sequence element: either a decoded `T`, or anything else.
///
/// The untagged representation buffers the element, tries `T`, and falls back
/// to [`IgnoredAny`], which accepts every input. That is what lets the outer
/// sequence advance past a bad element.
#[derive(Deserialize)]
#[serde(untagged)]
enum Slot<T> {
    Decoded(T),
    Rejected(IgnoredAny),
}

struct LossyVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for LossyVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = LossyList<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        let mut skipped = 0;
        while let Some(slot) = seq.next_element::<Slot<T>>()? {
            match slot {
                Slot::Decoded(element) => elements.push(element),
                Slot::Rejected(IgnoredAny) => skipped += 1,
            }
        }
        Ok(LossyList { elements, skipped })
    }
}

impl<'de, T> Deserialize<'de> for LossyList<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(LossyVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for LossyList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(&self.elements, serializer)
    }
}

/// `deserialize_with` helper for `Vec<T>` fields.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    LossyList::deserialize(deserializer).map(LossyList::into_inner)
}

/// `serialize_with` helper: encode each element on its own, omitting failures.
///
/// Elements are first encoded to JSON values so a failing element can be
/// discarded before anything reaches `serializer`.
pub fn serialize<S, T>(elements: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let encoded: Vec<Value> = elements
        .iter()
        .filter_map(|element| serde_json::to_value(element).ok())
        .collect();

    let mut seq = serializer.serialize_seq(Some(encoded.len()))?;
    for value in &encoded {
        seq.serialize_element(value)?;
    }
    seq.end()
}

/// Decode already-parsed JSON fragments, dropping those that don't fit `T`.
pub fn decode_values<T, I>(values: I) -> LossyList<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = Value>,
{
    let mut list = LossyList::default();
    for value in values {
        match serde_json::from_value(value) {
            Ok(element) => list.elements.push(element),
            Err(_) => list.skipped += 1,
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use serde::ser::Error as _;
    use serde::{Deserialize, Serialize, Serializer};
    use serde_json::json;

    use super::{LossyList, decode_values};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    struct Item {
        id: u32,
        name: String,
    }

    #[test]
    fn drops_malformed_elements_in_order() {
        let input = json!([
            {"id": 1, "name": "one"},
            {"id": "two", "name": "two"},
            {"id": 3, "name": "three"},
            {"name": "four"},
            {"id": 5, "name": "five"},
        ]);
        let list: LossyList<Item> = serde_json::from_value(input).unwrap();
        let ids: Vec<u32> = list.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(list.skipped(), 2);
    }

    #[test]
    fn empty_and_all_bad_inputs_are_empty_lists() {
        let empty: LossyList<Item> = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.skipped(), 0);

        let bad: LossyList<Item> = serde_json::from_str(r#"[1, "x", null, [], {}]"#).unwrap();
        assert!(bad.is_empty());
        assert_eq!(bad.skipped(), 5);
    }

    #[test]
    fn non_sequence_is_an_error() {
        assert!(serde_json::from_str::<LossyList<Item>>(r#"{"id": 1}"#).is_err());
        assert!(serde_json::from_str::<LossyList<Item>>("null").is_err());
    }

    #[test]
    fn nested_lossy_lists_only_drop_inner_elements() {
        let input = r#"[[1, "a", 2], "not a list", [3]]"#;
        let outer: LossyList<LossyList<u8>> = serde_json::from_str(input).unwrap();
        let flattened: Vec<Vec<u8>> = outer.into_iter().map(LossyList::into_inner).collect();
        assert_eq!(flattened, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn output_elements_decode_in_isolation() {
        let raw = vec![json!(1), json!(-4), json!(300), json!("7"), json!(9)];
        let list: LossyList<u8> = decode_values(raw.clone());
        assert!(list.len() <= raw.len());
        for kept in list.iter() {
            assert!(
                raw.iter()
                    .any(|value| serde_json::from_value::<u8>(value.clone()).ok() == Some(*kept))
            );
        }
        assert_eq!(list.as_slice(), &[1, 9]);
        assert_eq!(list.skipped(), 3);
    }

    #[derive(Debug)]
    struct Fragile(Option<u32>);

    impl Serialize for Fragile {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self.0 {
                Some(value) => serializer.serialize_u32(value),
                None => Err(S::Error::custom("cannot encode")),
            }
        }
    }

    #[test]
    fn encoding_omits_failing_elements() {
        let list = LossyList::from(vec![Fragile(Some(1)), Fragile(None), Fragile(Some(3))]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[1,3]");
    }

    #[test]
    fn field_helpers_round_trip() {
        #[derive(Debug, PartialEq, Deserialize, Serialize)]
        struct Feed {
            #[serde(
                deserialize_with = "super::deserialize",
                serialize_with = "super::serialize"
            )]
            items: Vec<Item>,
        }

        let feed: Feed =
            serde_json::from_str(r#"{"items": [{"id": 1, "name": "a"}, {"id": -1}]}"#).unwrap();
        assert_eq!(
            feed.items,
            vec![Item {
                id: 1,
                name: "a".to_string()
            }]
        );
        assert_eq!(
            serde_json::to_value(&feed).unwrap(),
            json!({"items": [{"id": 1, "name": "a"}]})
        );
    }
}
