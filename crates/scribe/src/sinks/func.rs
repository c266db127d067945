//! FnSink - a sink assembled from two closures

use contracts::{Edit, EditSink};

/// Sink whose capabilities are a pair of owned closures
///
/// Closures capture whatever buffer they write into; the scribe only ever
/// calls one of them at a time.
pub struct FnSink<A, D> {
    name: String,
    add: A,
    delete: D,
}

impl<A, D> FnSink<A, D>
where
    A: FnMut(Edit) -> bool + Send,
    D: FnMut(Edit) -> bool + Send,
{
    pub fn new(name: impl Into<String>, add: A, delete: D) -> Self {
        Self {
            name: name.into(),
            add,
            delete,
        }
    }
}

impl<A, D> EditSink for FnSink<A, D>
where
    A: FnMut(Edit) -> bool + Send,
    D: FnMut(Edit) -> bool + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_add(&mut self, edit: Edit) -> bool {
        (self.add)(edit)
    }

    fn apply_delete(&mut self, edit: Edit) -> bool {
        (self.delete)(edit)
    }
}
