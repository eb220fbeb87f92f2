use crate::models::error::SError;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::debug;

/// Durable home of one piece of engine state.
pub trait DurableStore<T> {
    /// Returns the default value when nothing has been saved yet.
    fn load(&self) -> Result<T, SError>;
    fn save(&self, value: &T) -> Result<(), SError>;
}

/// A pretty-printed JSON document on disk.
pub struct JsonStore<T> {
    path: Utf8PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T> {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned + Default> DurableStore<T> for JsonStore<T> {
    fn load(&self) -> Result<T, SError> {
        if !self.path.exists() {
            debug!("No store at {}, starting empty", self.path);
            return Ok(T::default());
        }
        let s = std::fs::read_to_string(&self.path).map_err(|e| SError::io(&self.path, e))?;
        serde_json::from_str::<T>(&s)
            .map_err(|e| SError::ConfigCorrupt(format!("{}: {e}", self.path)))
    }

    fn save(&self, value: &T) -> Result<(), SError> {
        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| SError::ParseError(e.to_string()))?;
        FileUtils::write_atomic(&self.path, raw.as_bytes())
    }
}

/// Keeps the value in memory only. Lets the engine run without state files.
#[derive(Default)]
pub struct MemoryStore<T> {
    value: Mutex<Option<T>>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }

    /// The last saved value, if any.
    pub fn snapshot(&self) -> Option<T> {
        self.value.lock().clone()
    }
}

impl<T: Clone + Default> DurableStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<T, SError> {
        Ok(self.value.lock().clone().unwrap_or_default())
    }

    fn save(&self, value: &T) -> Result<(), SError> {
        *self.value.lock() = Some(value.clone());
        Ok(())
    }
}

impl<T, S: DurableStore<T> + ?Sized> DurableStore<T> for std::sync::Arc<S> {
    fn load(&self) -> Result<T, SError> {
        (**self).load()
    }

    fn save(&self, value: &T) -> Result<(), SError> {
        (**self).save(value)
    }
}
