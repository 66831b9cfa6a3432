use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use super::error::ConvarError;
use super::value::{Convar, ConvarType, ConvarValue, IntoConvar};

/// Type-erased view of a registered convar.
trait ErasedConvar {
    fn convar_type(&self) -> ConvarType;
    fn as_any(&self) -> &dyn Any;
    fn set_text(&self, text: &str) -> Result<(), ConvarError>;
    fn value_text(&self) -> String;
}

impl<T: ConvarValue> ErasedConvar for Convar<T> {
    fn convar_type(&self) -> ConvarType {
        T::TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_text(&self, text: &str) -> Result<(), ConvarError> {
        let value = T::parse_text(text).ok_or_else(|| ConvarError::InvalidValue {
            name: self.name().to_owned(),
            expected: T::TYPE,
            value: text.to_owned(),
        })?;
        self.set(value);
        Ok(())
    }

    fn value_text(&self) -> String {
        self.with(|v| v.to_string())
    }
}

/// Named, typed, runtime-tunable values.
///
/// Keys are kept in sorted order so listings are stable.
#[derive(Default)]
pub struct ConvarRegistry {
    entries: BTreeMap<String, Box<dyn ErasedConvar>>,
}

impl ConvarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with an initial value.
    ///
    /// An existing key is never overwritten: the existing convar is returned
    /// when its type matches, `None` when it does not.
    pub fn register_key<V: IntoConvar>(&mut self, name: &str, value: V) -> Option<Convar<V::Value>> {
        if let Some(existing) = self.entries.get(name) {
            return match existing.as_any().downcast_ref::<Convar<V::Value>>() {
                Some(convar) => {
                    log::warn!("convar `{name}` already registered; keeping its current value");
                    Some(convar.clone())
                }
                None => {
                    log::warn!(
                        "convar `{name}` already registered as {}, not {}",
                        existing.convar_type(),
                        V::Value::TYPE
                    );
                    None
                }
            };
        }

        let convar = Convar::new(name, value.into_convar());
        self.entries.insert(name.to_owned(), Box::new(convar.clone()));
        log::debug!("registered convar {convar}");
        Some(convar)
    }

    /// Looks up `name` as a `T` convar.
    pub fn read<T: ConvarValue>(&self, name: &str) -> Option<Convar<T>> {
        let entry = self.entries.get(name)?;
        match entry.as_any().downcast_ref::<Convar<T>>() {
            Some(convar) => Some(convar.clone()),
            None => {
                log::warn!(
                    "convar `{name}` is {}, read as {}",
                    entry.convar_type(),
                    T::TYPE
                );
                None
            }
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn type_of(&self, name: &str) -> Option<ConvarType> {
        self.entries.get(name).map(|e| e.convar_type())
    }

    /// Current value formatted as console text.
    pub fn value_text(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(|e| e.value_text())
    }

    /// Parses `text` according to the registered type of `name` and stores it.
    pub fn set_from_str(&self, name: &str, text: &str) -> Result<(), ConvarError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ConvarError::UnknownKey(name.to_owned()))?;
        entry.set_text(text)
    }

    /// Applies `name=value` overrides in order.
    ///
    /// Every override is attempted; the failures are returned.
    pub fn apply_overrides<I, S>(&self, overrides: I) -> Vec<ConvarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut errors = Vec::new();

        for line in overrides {
            let line = line.as_ref();
            let result = match line.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    self.set_from_str(name.trim(), value.trim())
                }
                _ => Err(ConvarError::MalformedOverride(line.to_owned())),
            };

            if let Err(e) = result {
                log::warn!("{e}");
                errors.push(e);
            }
        }

        errors
    }

    /// `(name, type, value text)` for every convar, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ConvarType, String)> + '_ {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.convar_type(), e.value_text()))
    }
}

impl fmt::Debug for ConvarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, e.value_text())))
            .finish()
    }
}
