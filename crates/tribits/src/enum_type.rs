use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use num_bigint::{BigInt, BigUint};

use crate::{BitsError, BitsType, BitsValue, HashMap, HostValue, IntTag};

struct EnumInfo {
    name: String,
    tags: Vec<String>,
    lookup: HashMap<String, usize>,
}

/// Closed set of named values. Two enum types are only equal if they are the
/// same instance, even when their tags match.
#[derive(Clone)]
pub struct EnumType(Arc<EnumInfo>);

impl EnumType {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        tags: impl IntoIterator<Item = S>,
    ) -> Result<Self, BitsError> {
        let name = name.into();
        let mut lookup = HashMap::default();
        let mut names = Vec::new();
        for (i, tag) in tags.into_iter().enumerate() {
            let tag = tag.into();
            if lookup.insert(tag.clone(), i).is_some() {
                return Err(BitsError::DuplicateTag { name, tag });
            }
            names.push(tag);
        }
        Ok(Self(Arc::new(EnumInfo {
            name,
            tags: names,
            lookup,
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn tags(&self) -> &[String] {
        &self.0.tags
    }

    /// Bits needed to encode every tag index.
    pub fn bit_length(&self) -> usize {
        let n = self.0.tags.len();
        if n <= 1 {
            1
        } else {
            (usize::BITS - (n - 1).leading_zeros()) as usize
        }
    }

    pub fn value(&self, tag: &str) -> Option<EnumValue> {
        self.0.lookup.get(tag).map(|&i| EnumValue {
            dtype: self.clone(),
            val: Some(i),
        })
    }

    /// Every value in declaration order.
    pub fn values(&self) -> impl Iterator<Item = EnumValue> + '_ {
        (0..self.0.tags.len()).map(move |i| EnumValue {
            dtype: self.clone(),
            val: Some(i),
        })
    }

    pub fn unknown(&self) -> EnumValue {
        EnumValue {
            dtype: self.clone(),
            val: None,
        }
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType")
            .field("name", &self.0.name)
            .field("tags", &self.0.tags)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    dtype: EnumType,
    val: Option<usize>,
}

impl EnumValue {
    pub fn dtype(&self) -> &EnumType {
        &self.dtype
    }

    pub fn tag(&self) -> Option<&str> {
        self.val.map(|i| self.dtype.0.tags[i].as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.val.is_some()
    }

    pub fn is(&self, other: &EnumValue) -> bool {
        self == other
    }

    fn compare(&self, other: &EnumValue, eq: bool) -> Result<BitsValue, BitsError> {
        if self.dtype != other.dtype {
            return Err(BitsError::IncompatibleType {
                expected: self.dtype.name().to_string(),
                found: other.dtype.name().to_string(),
            });
        }
        let res = (self.val == other.val) == eq;
        let vld = self.is_valid() && other.is_valid();
        Ok(BitsType::bit().from_raw_parts(
            BigUint::from(u8::from(res)),
            BigUint::from(u8::from(vld)),
        ))
    }

    pub fn cmp_eq(&self, other: &EnumValue) -> Result<BitsValue, BitsError> {
        self.compare(other, true)
    }

    pub fn cmp_ne(&self, other: &EnumValue) -> Result<BitsValue, BitsError> {
        self.compare(other, false)
    }
}

impl IntTag for EnumValue {
    fn int_tag(&self) -> Option<BigInt> {
        self.val.map(BigInt::from)
    }
}

impl From<&EnumValue> for HostValue {
    fn from(value: &EnumValue) -> Self {
        HostValue::tag(value)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "<{}.{tag}>", self.dtype.name()),
            None => write!(f, "<{} invalid>", self.dtype.name()),
        }
    }
}
