use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Pre-order index of a compound value within one encode/decode pair.
pub type Position = u64;

pub type Sequence = Rc<RefCell<Vec<Value>>>;
pub type Mapping = Rc<RefCell<BTreeMap<Scalar, Value>>>;

/// Atomic value. Scalars carry no identity; they are always written by value.
///
/// Equality and ordering rank the variant first, so `Int(7)`, `Float(7.0)`
/// and `Str("7")` are all distinct mapping keys. Floats use `total_cmp`.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn rank(&self) -> u8 {
        match self {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::Int(_) => 2,
            Scalar::Float(_) => 3,
            Scalar::Str(_) => 4,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Ordering::Equal,
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

/// A node in an object graph.
///
/// Compound variants are shared handles: cloning a `Value::Sequence` or
/// `Value::Mapping` yields an alias of the same container, and mutation
/// through either is visible through both. Structural equality (`==`)
/// follows handles into their contents and does not terminate on cyclic
/// graphs; use [`Value::ptr_eq`] to compare identity. `Debug` prints a
/// container reached again from inside itself as `<cycle @addr>`.
///
/// Dropping and comparing recurse once per nesting level.
#[derive(Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn str(v: &str) -> Self {
        Value::Scalar(Scalar::from(v))
    }

    pub fn int(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }

    pub fn bool(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }

    /// New sequence with its own identity.
    pub fn seq(items: Vec<Value>) -> Self {
        Value::Sequence(Rc::new(RefCell::new(items)))
    }

    /// New mapping with its own identity. Later duplicates of a key win.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<Scalar>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<BTreeMap<_, _>>();
        Value::Mapping(Rc::new(RefCell::new(map)))
    }

    pub fn empty_seq() -> Self {
        Self::seq(Vec::new())
    }

    pub fn empty_map() -> Self {
        Value::Mapping(Rc::new(RefCell::new(BTreeMap::new())))
    }

    pub fn is_compound(&self) -> bool {
        !matches!(self, Value::Scalar(_))
    }

    /// True when both values are the same compound instance.
    /// Scalars never share identity.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Sequence(a), Value::Sequence(b)) => Rc::ptr_eq(a, b),
            (Value::Mapping(a), Value::Mapping(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Address of the shared allocation, or `None` for scalars.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::Sequence(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Value::Mapping(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = RefCell::new(Vec::new());
        fmt::Debug::fmt(&GraphDebug { value: self, open: &open }, f)
    }
}

/// Debug view that tracks the containers currently being printed.
struct GraphDebug<'a> {
    value: &'a Value,
    open: &'a RefCell<Vec<usize>>,
}

impl GraphDebug<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> GraphDebug<'b> {
        GraphDebug {
            value,
            open: self.open,
        }
    }

    fn nested(
        &self,
        f: &mut fmt::Formatter<'_>,
        body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        let id = self.value.identity().unwrap_or_default();
        if self.open.borrow().contains(&id) {
            return write!(f, "<cycle @{:#x}>", id);
        }

        self.open.borrow_mut().push(id);
        let out = body(f);
        self.open.borrow_mut().pop();
        out
    }
}

impl fmt::Debug for GraphDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Scalar(s) => fmt::Debug::fmt(s, f),
            Value::Sequence(seq) => self.nested(f, |f| {
                f.debug_list()
                    .entries(seq.borrow().iter().map(|v| self.child(v)))
                    .finish()
            }),
            Value::Mapping(map) => self.nested(f, |f| {
                f.debug_map()
                    .entries(map.borrow().iter().map(|(k, v)| (k, self.child(v))))
                    .finish()
            }),
        }
    }
}
