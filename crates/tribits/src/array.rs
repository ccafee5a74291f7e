use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{BitsError, BitsType, BitsValue, HashMap, HostValue, Operand};

/// Fixed-size array of [`BitsType`] elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: BitsType,
    size: usize,
    name: Option<String>,
}

impl ArrayType {
    pub fn new(element: BitsType, size: usize) -> Self {
        Self {
            element,
            size,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn element(&self) -> &BitsType {
        &self.element
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bit_length(&self) -> usize {
        self.size * self.element.bit_length()
    }

    /// Array whose items are read as unknown.
    pub fn unknown(&self) -> ArrayValue {
        ArrayValue {
            dtype: self.clone(),
            items: HashMap::default(),
        }
    }

    /// Items in index order, starting at 0.
    pub fn from_py<V: Into<HostValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<ArrayValue, BitsError> {
        self.from_map(values.into_iter().enumerate())
    }

    /// Sparse initialization; indices not listed read as unknown.
    pub fn from_map<V: Into<HostValue>>(
        &self,
        values: impl IntoIterator<Item = (usize, V)>,
    ) -> Result<ArrayValue, BitsError> {
        let mut arr = self.unknown();
        for (i, v) in values {
            let i = arr.check_index(BigInt::from(i))?;
            arr.items.insert(i, self.element.from_py(v)?);
        }
        Ok(arr)
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<Array \"{name}\", {}[{}]>", self.element, self.size),
            None => write!(f, "<Array {}[{}]>", self.element, self.size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayValue {
    dtype: ArrayType,
    items: HashMap<usize, BitsValue>,
}

impl ArrayValue {
    pub fn dtype(&self) -> &ArrayType {
        &self.dtype
    }

    fn check_index(&self, index: BigInt) -> Result<usize, BitsError> {
        index
            .to_usize()
            .filter(|i| *i < self.dtype.size)
            .ok_or(BitsError::IndexOutOfRange {
                index,
                width: self.dtype.size,
            })
    }

    /// Stored item, or an unknown element when the item was never written or
    /// the index is not known.
    pub fn get<'o>(&self, index: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        let Some(i) = index.into().definite_int()? else {
            return Ok(self.dtype.element.unknown());
        };
        let i = self.check_index(i)?;
        Ok(self
            .items
            .get(&i)
            .cloned()
            .unwrap_or_else(|| self.dtype.element.unknown()))
    }

    /// Store an item. Writing through an unknown index forgets every item.
    pub fn set<'i, 'v>(
        &mut self,
        index: impl Into<Operand<'i>>,
        value: impl Into<Operand<'v>>,
    ) -> Result<(), BitsError> {
        let Some(i) = index.into().definite_int()? else {
            debug!("write to {} through an indeterminate index", self.dtype);
            self.items.clear();
            return Ok(());
        };
        let i = self.check_index(i)?;
        let item = match value.into() {
            Operand::Value(v) if v.dtype() == &self.dtype.element => v.clone(),
            Operand::Value(v) => {
                return Err(BitsError::IncompatibleType {
                    expected: self.dtype.element.to_string(),
                    found: v.dtype().to_string(),
                });
            }
            Operand::Host(h) => self.dtype.element.from_py(h)?,
        };
        self.items.insert(i, item);
        Ok(())
    }
}
