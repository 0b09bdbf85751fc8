//! Collection nodes holding aggregate elements.
//!
//! Elements are anonymous members of an already named collection: each one
//! saves as its bare contents and loads from the matching array item.

use std::any::Any;

use serde_json::Value;
use tracing::instrument;

use crate::domain::aggregate::Aggregate;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{downcast, require_name, Document, Node, Property};

fn save_elements<'a, T: Aggregate>(elements: impl Iterator<Item = &'a T>) -> DomainResult<Document> {
    elements
        .map(|element| element.save_contents())
        .collect::<DomainResult<Vec<_>>>()
        .map(Value::Array)
}

/// Load `items` pairwise into `elements`. Earlier elements stay loaded when a
/// later one fails.
fn load_elements<'a, T: Aggregate>(
    elements: impl Iterator<Item = &'a mut T>,
    items: &[Document],
) -> DomainResult<()> {
    for (element, item) in elements.zip(items) {
        element.load(item)?;
    }
    Ok(())
}

fn clone_elements<'a, 'b, T: Aggregate>(
    elements: impl Iterator<Item = &'a mut T>,
    sources: impl Iterator<Item = &'b T>,
) {
    for (element, source) in elements.zip(sources) {
        element.clone_from(source);
    }
}

fn expect_array<'d>(name: Option<&str>, doc: &'d Document) -> DomainResult<&'d Vec<Document>> {
    match doc {
        Value::Array(items) => Ok(items),
        other => Err(DomainError::shape(name, "array", other)),
    }
}

/// Variable-length collection; its length follows whatever was last loaded,
/// cloned or assigned into it.
#[derive(Debug, Clone)]
pub struct Sequence<T: Aggregate> {
    name: Option<String>,
    elements: Vec<T>,
}

impl<T: Aggregate> Default for Sequence<T> {
    fn default() -> Self {
        Self::unnamed()
    }
}

impl<T: Aggregate> Sequence<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            elements: Vec::new(),
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: None,
            elements: Vec::new(),
        }
    }

    /// Drop every element and refill with `size` fresh defaults.
    fn grow(&mut self, size: usize) {
        self.elements.clear();
        self.elements.resize_with(size, T::default);
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<T> {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn push(&mut self, element: T) {
        self.elements.push(element);
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }
}

impl<T: Aggregate> Node for Sequence<T> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn assign(&mut self, other: &dyn Node) -> DomainResult<()> {
        let source = downcast::<Self>(other)?;
        self.grow(source.len());
        clone_elements(self.elements.iter_mut(), source.elements.iter());
        Ok(())
    }

    #[instrument(level = "trace", skip_all, fields(sequence = ?self.name))]
    fn load(&mut self, doc: &Document) -> DomainResult<()> {
        require_name(self.name(), "sequence")?;
        let items = expect_array(self.name(), doc)?;
        self.grow(items.len());
        load_elements(self.elements.iter_mut(), items)
    }

    fn save_contents(&self) -> DomainResult<Document> {
        save_elements(self.elements.iter())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: Aggregate> Property for Sequence<T> {
    type Value = Vec<T>;

    fn value(&self) -> &Vec<T> {
        &self.elements
    }

    fn value_mut(&mut self) -> &mut Vec<T> {
        &mut self.elements
    }
}

/// Fixed-length collection of exactly `N` elements.
#[derive(Debug, Clone)]
pub struct Array<T: Aggregate, const N: usize> {
    name: Option<String>,
    elements: [T; N],
}

impl<T: Aggregate, const N: usize> Default for Array<T, N> {
    fn default() -> Self {
        Self::unnamed()
    }
}

impl<T: Aggregate, const N: usize> Array<T, N> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            elements: std::array::from_fn(|_| T::default()),
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: None,
            elements: std::array::from_fn(|_| T::default()),
        }
    }

    fn grow(&mut self) {
        self.elements = std::array::from_fn(|_| T::default());
    }

    pub fn elements(&self) -> &[T; N] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [T; N] {
        &mut self.elements
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }
}

impl<T: Aggregate, const N: usize> Node for Array<T, N> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn assign(&mut self, other: &dyn Node) -> DomainResult<()> {
        let source = downcast::<Self>(other)?;
        self.grow();
        clone_elements(self.elements.iter_mut(), source.elements.iter());
        Ok(())
    }

    #[instrument(level = "trace", skip_all, fields(array = ?self.name))]
    fn load(&mut self, doc: &Document) -> DomainResult<()> {
        let name = require_name(self.name(), "array")?;
        let items = expect_array(Some(name), doc)?;
        if items.len() != N {
            return Err(DomainError::MalformedCollection {
                name: name.to_string(),
                expected: N,
                found: items.len(),
            });
        }
        self.grow();
        load_elements(self.elements.iter_mut(), items)
    }

    fn save_contents(&self) -> DomainResult<Document> {
        save_elements(self.elements.iter())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: Aggregate, const N: usize> Property for Array<T, N> {
    type Value = [T; N];

    fn value(&self) -> &[T; N] {
        &self.elements
    }

    fn value_mut(&mut self) -> &mut [T; N] {
        &mut self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{Field, Registry};
    use crate::domain::scalar::Scalar;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Point {
        registry: Registry,
        x: Field<Scalar<i64>>,
    }

    impl Default for Point {
        fn default() -> Self {
            let mut registry = Registry::new("Point");
            let x = registry.add_value("X", 0_i64);
            Self { registry, x }
        }
    }

    impl Point {
        fn at(x: i64) -> Self {
            let mut point = Self::default();
            point.set_x(x);
            point
        }

        fn x(&self) -> i64 {
            *self.registry.value(&self.x).unwrap()
        }

        fn set_x(&mut self, x: i64) {
            self.registry.set(&self.x, x).unwrap();
        }
    }

    impl Aggregate for Point {
        fn registry(&self) -> &Registry {
            &self.registry
        }

        fn registry_mut(&mut self) -> &mut Registry {
            &mut self.registry
        }
    }

    crate::aggregate_node!(Point);

    fn xs<'a>(points: impl Iterator<Item = &'a Point>) -> Vec<i64> {
        points.map(Point::x).collect()
    }

    #[test]
    fn given_document_array_when_loading_sequence_then_resizes_to_match() {
        let mut sequence = Sequence::<Point>::new("Points");
        sequence.push(Point::at(99));

        sequence
            .load(&json!([{"X": 1}, {"X": 2}, {"X": 3}]))
            .unwrap();

        assert_eq!(xs(sequence.iter()), vec![1, 2, 3]);
    }

    #[test]
    fn given_loaded_sequence_when_mutating_one_element_then_others_unchanged() {
        let mut sequence = Sequence::<Point>::new("Points");
        sequence.load(&json!([{"X": 1}, {"X": 1}])).unwrap();

        sequence.get_mut(0).unwrap().set_x(5);

        assert_eq!(xs(sequence.iter()), vec![5, 1]);
    }

    #[test]
    fn given_sequence_when_saving_then_elements_drop_their_name() {
        let mut sequence = Sequence::<Point>::new("Points");
        sequence.push(Point::at(1));
        sequence.push(Point::at(2));

        assert_eq!(sequence.save().unwrap(), json!({"Points": [{"X": 1}, {"X": 2}]}));
    }

    #[test]
    fn given_unnamed_sequence_when_loading_then_missing_name() {
        let mut sequence = Sequence::<Point>::unnamed();
        let result = sequence.load(&json!([]));
        assert!(matches!(result, Err(DomainError::MissingName { kind: "sequence" })));
    }

    #[test]
    fn given_object_document_when_loading_sequence_then_unexpected_shape() {
        let mut sequence = Sequence::<Point>::new("Points");
        let result = sequence.load(&json!({"X": 1}));
        assert!(matches!(result, Err(DomainError::UnexpectedShape { expected: "array", .. })));
    }

    #[test]
    fn given_bad_element_when_loading_sequence_then_earlier_elements_stay_loaded() {
        let mut sequence = Sequence::<Point>::new("Points");

        let result = sequence.load(&json!([{"X": 4}, {"X": "four"}, {"X": 6}]));

        assert!(matches!(result, Err(DomainError::Conversion { .. })));
        assert_eq!(xs(sequence.iter()), vec![4, 0, 0]);
    }

    #[test]
    fn given_sequences_of_different_length_when_assigning_then_takes_source_length() {
        let mut target = Sequence::<Point>::new("Target");
        target.push(Point::at(1));
        let mut source = Sequence::<Point>::new("Source");
        for x in [7, 8, 9] {
            source.push(Point::at(x));
        }

        target.assign(&source).unwrap();
        assert_eq!(xs(target.iter()), vec![7, 8, 9]);
        assert_eq!(target.name(), Some("Target"));

        source.truncate(1);
        target.assign(&source).unwrap();
        assert_eq!(xs(target.iter()), vec![7]);
    }

    #[test]
    fn given_assigned_sequence_when_mutating_source_then_target_unchanged() {
        let mut source = Sequence::<Point>::new("Points");
        source.push(Point::at(1));
        let mut target = Sequence::<Point>::new("Points");

        target.assign(&source).unwrap();
        source.get_mut(0).unwrap().set_x(2);

        assert_eq!(target.get(0).unwrap().x(), 1);
    }

    #[test]
    fn given_cloned_sequence_when_mutating_original_then_clone_unchanged() {
        let mut sequence = Sequence::<Point>::new("Points");
        sequence.push(Point::at(3));
        let copy = sequence.clone_node();

        sequence.get_mut(0).unwrap().set_x(4);

        let copy = downcast::<Sequence<Point>>(copy.as_ref()).unwrap();
        assert_eq!(xs(copy.iter()), vec![3]);
        assert_eq!(copy.name(), Some("Points"));
    }

    #[test]
    fn given_scalar_when_assigning_to_sequence_then_type_mismatch() {
        let mut sequence = Sequence::<Point>::new("Points");
        let result = sequence.assign(&Scalar::new("Points", 1_i64));
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
    }

    #[test]
    fn given_exact_length_when_loading_array_then_loads_every_element() {
        let mut array = Array::<Point, 2>::new("Pair");
        array.load(&json!([{"X": 1}, {"X": 2}])).unwrap();
        assert_eq!(xs(array.iter()), vec![1, 2]);
        assert_eq!(array.save().unwrap(), json!({"Pair": [{"X": 1}, {"X": 2}]}));
    }

    #[test]
    fn given_wrong_length_when_loading_array_then_malformed_and_untouched() {
        let mut array = Array::<Point, 2>::new("Pair");
        array.get_mut(0).unwrap().set_x(5);

        let result = array.load(&json!([{"X": 1}, {"X": 2}, {"X": 3}]));

        assert!(matches!(
            result,
            Err(DomainError::MalformedCollection { expected: 2, found: 3, .. })
        ));
        assert_eq!(xs(array.iter()), vec![5, 0]);
    }

    #[test]
    fn given_unnamed_array_when_loading_then_missing_name() {
        let mut array = Array::<Point, 1>::unnamed();
        let result = array.load(&json!([{"X": 1}]));
        assert!(matches!(result, Err(DomainError::MissingName { kind: "array" })));
    }

    #[test]
    fn given_arrays_when_assigning_then_copies_elements() {
        let mut source = Array::<Point, 2>::new("Pair");
        source.get_mut(1).unwrap().set_x(8);
        let mut target = Array::<Point, 2>::new("Pair");

        target.assign(&source).unwrap();
        source.get_mut(1).unwrap().set_x(9);

        assert_eq!(xs(target.iter()), vec![0, 8]);
    }

    #[test]
    fn given_array_of_other_length_when_assigning_then_type_mismatch() {
        let mut target = Array::<Point, 2>::new("Pair");
        let source = Array::<Point, 3>::new("Pair");
        let result = target.assign(&source);
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
    }
}
