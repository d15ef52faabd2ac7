use crate::{model::TypeExpr, step::Stream, value::Value};

///
/// ObjectSource
///
/// Supplies every instance of a type found in a loaded document. Order is
/// not required to be stable between calls; the stream must be finite.
///

pub trait ObjectSource {
    fn objects<'a>(&'a self, ty: &TypeExpr) -> Stream<'a>;
}

///
/// MemorySource
///
/// Object source over an in-memory list of values.
///

#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    objects: Vec<Value>,
}

impl MemorySource {
    #[must_use]
    pub const fn new(objects: Vec<Value>) -> Self {
        Self { objects }
    }

    pub fn push(&mut self, object: impl Into<Value>) {
        self.objects.push(object.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectSource for MemorySource {
    fn objects<'a>(&'a self, ty: &TypeExpr) -> Stream<'a> {
        let ty = ty.clone();

        Box::new(
            self.objects
                .iter()
                .filter(move |object| object.type_expr() == ty)
                .cloned(),
        )
    }
}

impl<T: Into<Value>> FromIterator<T> for MemorySource {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
