use coil_animation::Channels;

/// Channel label used to store a bare scalar inside the engine's channel
/// map. Purely a storage detail: unboxing consults [`ValueShape`], never
/// this name, so a record field may share it without ambiguity.
pub(crate) const SCALAR_CHANNEL: &str = "value";

/// A value driven through an animated binding: either a bare scalar or
/// a record of named fields.
///
/// The shape is fixed per slot by the binding's initializer and is
/// expected to stay consistent across writes to that slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f32),
    Record(Channels),
}

/// Out-of-band discriminant remembered per slot so values can be
/// unboxed without inspecting channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    Record,
}

impl Value {
    /// Builds a record value from `(field, value)` pairs.
    pub fn record<const N: usize>(fields: [(&str, f32); N]) -> Self {
        Value::Record(coil_animation::channels(fields))
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Scalar(_) => ValueShape::Scalar,
            Value::Record(_) => ValueShape::Record,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(value) => Some(*value),
            Value::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Channels> {
        match self {
            Value::Scalar(_) => None,
            Value::Record(fields) => Some(fields),
        }
    }

    /// Field accessor for record values; `None` on scalars and missing
    /// fields.
    pub fn field(&self, name: &str) -> Option<f32> {
        self.as_record().and_then(|fields| fields.get(name).copied())
    }

    /// Boxes the value into the channel map handed to the engine: a
    /// record keeps its own fields, a scalar becomes a single reserved
    /// channel.
    pub(crate) fn into_channels(self) -> Channels {
        match self {
            Value::Scalar(value) => {
                let mut fields = Channels::with_capacity(1);
                fields.insert(SCALAR_CHANNEL.to_string(), value);
                fields
            }
            Value::Record(fields) => fields,
        }
    }

    /// Inverse of [`Value::into_channels`], dispatching on the slot's
    /// remembered shape.
    pub(crate) fn from_channels(shape: ValueShape, fields: &Channels) -> Self {
        match shape {
            ValueShape::Scalar => Value::Scalar(
                fields
                    .get(SCALAR_CHANNEL)
                    .copied()
                    .expect("scalar slot missing its reserved channel"),
            ),
            ValueShape::Record => Value::Record(fields.clone()),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Scalar(value)
    }
}

impl From<Channels> for Value {
    fn from(fields: Channels) -> Self {
        Value::Record(fields)
    }
}

#[cfg(test)]
#[path = "tests/value_tests.rs"]
mod tests;
