//! Arena-backed partition of `0..size` into disjoint classes.
//!
//! All elements live in one array; every class is a contiguous slice of it. Marking an
//! element swaps it into the marked prefix of its class, and splitting turns that
//! prefix into a new class, so refinement never rebuilds the untouched classes.

pub(super) struct Partition {
    /// Permutation of the elements, grouped by class
    elements: Vec<usize>,
    /// Element -> position in `elements`
    location: Vec<usize>,
    /// Element -> class
    class_of: Vec<usize>,
    /// Class -> first position
    first: Vec<usize>,
    /// Class -> one past the last position
    end: Vec<usize>,
    /// Class -> length of its marked prefix
    marked: Vec<usize>,
    /// Classes with at least one marked element
    touched: Vec<usize>,
}

impl Partition {
    /// Build a partition from an initial class label per element. Labels must be
    /// `0..m` with every label used at least once.
    pub(super) fn from_labels(labels: &[usize]) -> Self {
        let num_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
        let mut counts = vec![0usize; num_classes];
        for &label in labels {
            counts[label] += 1;
        }

        let mut first = Vec::with_capacity(num_classes);
        let mut end = Vec::with_capacity(num_classes);
        let mut offset = 0;
        for &count in &counts {
            first.push(offset);
            offset += count;
            end.push(offset);
        }

        let mut elements = vec![0; labels.len()];
        let mut location = vec![0; labels.len()];
        let mut cursor = first.clone();
        for (element, &label) in labels.iter().enumerate() {
            let pos = cursor[label];
            cursor[label] += 1;
            elements[pos] = element;
            location[element] = pos;
        }

        Self {
            elements,
            location,
            class_of: labels.to_vec(),
            first,
            end,
            marked: vec![0; num_classes],
            touched: Vec::new(),
        }
    }

    pub(super) fn num_classes(&self) -> usize {
        self.first.len()
    }

    #[inline]
    pub(super) fn class_of(&self, element: usize) -> usize {
        self.class_of[element]
    }

    #[inline]
    pub(super) fn size(&self, class: usize) -> usize {
        self.end[class] - self.first[class]
    }

    pub(super) fn members(&self, class: usize) -> &[usize] {
        &self.elements[self.first[class]..self.end[class]]
    }

    /// Mark an element for the next [`Partition::split_marked`].
    pub(super) fn mark(&mut self, element: usize) {
        let class = self.class_of[element];
        let boundary = self.first[class] + self.marked[class];
        let pos = self.location[element];
        if pos < boundary {
            return;
        }
        let other = self.elements[boundary];
        self.elements.swap(pos, boundary);
        self.location[other] = pos;
        self.location[element] = boundary;
        if self.marked[class] == 0 {
            self.touched.push(class);
        }
        self.marked[class] += 1;
    }

    /// Split every class whose marked part is a proper subset; the marked part becomes
    /// a new class. Returns `(old, new)` for each split and clears all marks.
    pub(super) fn split_marked(&mut self) -> Vec<(usize, usize)> {
        let mut splits = Vec::new();
        for class in std::mem::take(&mut self.touched) {
            let marked = std::mem::take(&mut self.marked[class]);
            if marked == self.size(class) {
                continue;
            }
            let new_class = self.first.len();
            let start = self.first[class];
            self.first.push(start);
            self.end.push(start + marked);
            self.marked.push(0);
            self.first[class] = start + marked;
            for pos in start..start + marked {
                self.class_of[self.elements[pos]] = new_class;
            }
            splits.push((class, new_class));
        }
        splits
    }
}
