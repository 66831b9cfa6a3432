use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Storage type of a convar.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConvarType {
    String,
    Float,
    Int,
    Bool,
}

impl fmt::Display for ConvarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConvarType::String => "string",
            ConvarType::Float => "float",
            ConvarType::Int => "int",
            ConvarType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Rust types a convar can hold.
pub trait ConvarValue: Clone + PartialEq + fmt::Display + fmt::Debug + 'static {
    const TYPE: ConvarType;

    /// Parses console text. `None` when the text is not a valid value.
    fn parse_text(text: &str) -> Option<Self>;
}

impl ConvarValue for String {
    const TYPE: ConvarType = ConvarType::String;

    fn parse_text(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }
}

impl ConvarValue for f32 {
    const TYPE: ConvarType = ConvarType::Float;

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ConvarValue for i32 {
    const TYPE: ConvarType = ConvarType::Int;

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl ConvarValue for bool {
    const TYPE: ConvarType = ConvarType::Bool;

    fn parse_text(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" => Some(false),
            _ => None,
        }
    }
}

/// Values accepted by `ConvarRegistry::register_key`.
///
/// String slices register `String` convars.
pub trait IntoConvar {
    type Value: ConvarValue;

    fn into_convar(self) -> Self::Value;
}

macro_rules! into_convar_identity {
    ($($t:ty),*) => {
        $(impl IntoConvar for $t {
            type Value = $t;

            fn into_convar(self) -> $t {
                self
            }
        })*
    };
}

into_convar_identity!(String, f32, i32, bool);

impl IntoConvar for &str {
    type Value = String;

    fn into_convar(self) -> String {
        self.to_owned()
    }
}

/// Shared handle to one convar value.
///
/// Clones share storage: a write through any handle (or through the registry)
/// is visible through all of them.
pub struct Convar<T> {
    name: Rc<str>,
    value: Rc<RefCell<T>>,
}

impl<T: ConvarValue> Convar<T> {
    pub(crate) fn new(name: &str, value: T) -> Self {
        Self {
            name: Rc::from(name),
            value: Rc::new(RefCell::new(value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
    }

    /// Reads the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Mutates the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
    }

    /// True when both handles share storage.
    pub fn same_as(&self, other: &Convar<T>) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Clone for Convar<T> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            value: Rc::clone(&self.value),
        }
    }
}

impl<T: ConvarValue> PartialEq<T> for Convar<T> {
    fn eq(&self, other: &T) -> bool {
        *self.value.borrow() == *other
    }
}

impl<T: ConvarValue + PartialOrd> PartialOrd<T> for Convar<T> {
    fn partial_cmp(&self, other: &T) -> Option<Ordering> {
        self.value.borrow().partial_cmp(other)
    }
}

impl<T: ConvarValue> fmt::Debug for Convar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Convar")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .finish()
    }
}

impl<T: ConvarValue> fmt::Display for Convar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value.borrow())
    }
}
