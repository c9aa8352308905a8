use super::error::ParameterError;
use super::value::{Value, ValueSlot};

/// Kind of entry a parameter was declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterKind {
    /// `##$NAME=` declaration with optional dimensions and values
    #[default]
    Plain,
    /// `##TEXT` header line such as `##TITLE=` or `##END=`
    Info,
    /// `$$ @vis=` visualization line
    Visualization,
}

/// Number of value slots for the given dimensions.
///
/// Strings are stored one per row: with one dimension the whole array is a
/// single string, with two dimensions the second is the string length.
pub fn value_capacity(dimensions: &[usize], strings: bool) -> usize {
    let product = dimensions
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .unwrap_or(usize::MAX);
    let divisor = match (strings, dimensions) {
        (true, [d]) => *d,
        (true, [_, d]) => *d,
        _ => 1,
    };
    let capacity = if divisor == 0 { product } else { product / divisor };
    capacity.max(1)
}

/// A named, dimensioned entry of a parameter file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    dimensions: Vec<usize>,
    /// Allocated on the first value write
    slots: Option<Vec<ValueSlot>>,
    cursor: usize,
    multi_value: bool,
}

impl Parameter {
    /// Create an empty parameter of the given kind
    pub fn new(kind: ParameterKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Create a named plain parameter
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parameter name (empty for info and visualization entries)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assign the parameter name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Declared kind
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Change the declared kind
    pub fn set_kind(&mut self, kind: ParameterKind) {
        self.kind = kind;
    }

    /// Declared dimension sizes, in declaration order
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Declare one more dimension.
    ///
    /// Capacity is fixed by the first value write, so dimensions appended after
    /// that have no effect on storage.
    pub fn append_dimension(&mut self, size: usize) {
        self.dimensions.push(size);
    }

    /// Number of allocated value slots (0 until the first value arrives)
    pub fn capacity(&self) -> usize {
        self.slots.as_ref().map_or(0, Vec::len)
    }

    /// Whether multi-value mode is active
    pub fn is_multi_value_mode(&self) -> bool {
        self.multi_value
    }

    /// Index of the slot the next value will be written to
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// All allocated slots
    pub fn slots(&self) -> &[ValueSlot] {
        self.slots.as_deref().unwrap_or(&[])
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&ValueSlot> {
        self.slots().get(index)
    }

    /// Head value of slot `index`, if it has been assigned
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.slot(index).map(ValueSlot::head).filter(|v| v.is_set())
    }

    /// Iterate over the head value of every assigned slot
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.slots().iter().map(ValueSlot::head).filter(|v| v.is_set())
    }

    fn allocate(&mut self, strings: bool) -> Result<&mut Vec<ValueSlot>, ParameterError> {
        if self.slots.is_none() {
            let capacity = value_capacity(&self.dimensions, strings);
            let mut slots = Vec::new();
            slots
                .try_reserve_exact(capacity)
                .map_err(|_| ParameterError::CapacityExceeded {
                    parameter: self.name.clone(),
                    capacity,
                })?;
            slots.resize(capacity, ValueSlot::new());
            self.slots = Some(slots);
        }
        Ok(self.slots.get_or_insert_with(Vec::new))
    }

    /// Store a value at the cursor.
    ///
    /// Outside multi-value mode the cursor then advances; inside it every value
    /// lands in the same slot's chain.
    pub fn new_value(&mut self, value: Value) -> Result<(), ParameterError> {
        let cursor = self.cursor;
        let slots = self.allocate(value.is_string())?;
        if let Some(slot) = slots.get_mut(cursor) {
            slot.append_value(value);
        } else {
            let capacity = slots.len();
            return Err(ParameterError::CapacityExceeded {
                parameter: self.name.clone(),
                capacity,
            });
        }
        if !self.multi_value {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Enter or leave multi-value mode; leaving advances the cursor once.
    ///
    /// Slots are allocated by the first value of the group, so a group that
    /// opens with a string gets the string capacity.
    pub fn set_multi_value_mode(&mut self, on: bool) -> Result<(), ParameterError> {
        if !on {
            // An empty group still occupies its slot
            self.allocate(false)?;
            self.cursor += 1;
        }
        self.multi_value = on;
        Ok(())
    }
}
