use std::collections::HashMap;

use super::{AsTargets, Label, Labels};
use ndarray::{ArrayBase, ArrayView1, Data, Ix1};

/// A one-dimensional NdArray can act as targets
impl<L, S: Data<Elem = L>> AsTargets for ArrayBase<S, Ix1> {
    type Elem = L;

    fn as_targets(&self) -> ArrayView1<'_, L> {
        self.view()
    }
}

/// A NdArray with discrete labels can act as labels
impl<L: Label, S: Data<Elem = L>> Labels for ArrayBase<S, Ix1> {
    type Elem = L;

    fn label_count(&self) -> HashMap<L, usize> {
        let mut count = HashMap::new();

        for label in self.iter() {
            *count.entry(label.clone()).or_insert(0) += 1;
        }

        count
    }
}
