use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(value) => value as f64,
            Value::Float(value) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
        }
    }
}

pub fn previous_volume_key(input: &str) -> String {
    format!("PreviousVolume_{}", input)
}

pub fn volume_db_key(input: &str) -> String {
    format!("{}_VolumeDB", input)
}

pub fn volume_mul_key(input: &str) -> String {
    format!("{}_VolumeMul", input)
}

pub trait KeyValueStore {
    fn set(&self, key: &str, value: Value);
    fn get(&self, key: &str) -> Option<Value>;

    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }
}

impl<'a, S: KeyValueStore + ?Sized> KeyValueStore for &'a S {
    fn set(&self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn set(&self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }
}

// Process-wide key space, shared by the controller and whoever polls it
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    // sorted by key
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<(String, Value)> =
            values.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: Value) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(String::from(key), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(previous_volume_key("Mic"), "PreviousVolume_Mic");
        assert_eq!(volume_db_key("Mic"), "Mic_VolumeDB");
        assert_eq!(volume_mul_key("Mic"), "Mic_VolumeMul");
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let store = MemoryStore::new();
        assert_eq!(store.get_or("missing", Value::Int(0)), Value::Int(0));
        store.set("present", Value::Int(-40));
        assert_eq!(store.get_or("present", Value::Int(0)), Value::Int(-40));
    }

    #[test]
    fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("a", Value::Int(1));
        store.set("a", Value::Float(2.5));
        assert_eq!(store.get("a"), Some(Value::Float(2.5)));
        assert_eq!(store.snapshot(), vec![(String::from("a"), Value::Float(2.5))]);
    }
}
