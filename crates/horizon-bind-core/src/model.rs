//! Observable key/value models.
//!
//! A [`Model`] maps property names to [`serde_json::Value`]s and notifies
//! listeners when a property changes. Two kinds of listeners exist:
//!
//! - property listeners ([`Model::on_change`]), the `change:<name>` event;
//! - general listeners ([`Model::on_any_change`]), the `change` event, fired
//!   after the property listeners for every changed property.
//!
//! Listener registrations are identified by [`ListenerId`] and can be removed
//! one at a time with [`Model::off`], or all together with
//! [`Model::off_all_changes`].
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::Model;
//! use serde_json::json;
//!
//! let model = Model::new();
//! let id = model.on_change("title", |event| {
//!     println!("title is now {:?}", event.value);
//! });
//!
//! assert!(model.set("title", "Report"));
//! assert!(!model.set("title", "Report")); // unchanged, no event
//! assert_eq!(model.get("title"), Some(json!("Report")));
//!
//! model.off(&id);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};
use crate::logging::targets;
use crate::signal::{ConnectionId, Signal};

/// Notification delivered to change listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// The property that changed.
    pub property: String,
    /// The new value, `None` if the property was unset.
    pub value: Option<Value>,
    /// The value before the change, `None` if the property was not set.
    pub previous: Option<Value>,
}

/// Handle for a single listener registration on a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId {
    /// `None` for general (`change`) listeners.
    property: Option<String>,
    connection: ConnectionId,
}

impl ListenerId {
    /// The property this listener observes, `None` for general listeners.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }
}

/// An observable property map.
///
/// `Model` is `Send + Sync` and is usually shared as `Arc<Model>` between the
/// code that writes it and the binders that observe it. Listeners run
/// synchronously inside the mutating call, after the attribute lock has been
/// released, so they may read or write the model themselves.
pub struct Model {
    attributes: RwLock<Map<String, Value>>,
    property_signals: Mutex<HashMap<String, Arc<Signal<ChangeEvent>>>>,
    changed: Signal<ChangeEvent>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::from_attributes(Map::new())
    }

    /// Create a model from an attribute map.
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            attributes: RwLock::new(attributes),
            property_signals: Mutex::new(HashMap::new()),
            changed: Signal::new(),
        }
    }

    /// Create a model from a JSON object.
    pub fn from_json(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_attributes(map)),
            other => Err(ModelError::NotAnObject(json_kind(&other))),
        }
    }

    /// Get the current value of a property.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.read().get(name).cloned()
    }

    /// Returns true if the property is set.
    pub fn has(&self, name: &str) -> bool {
        self.attributes.read().contains_key(name)
    }

    /// All property names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.attributes.read().keys().cloned().collect()
    }

    /// Number of set properties.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Returns true if no property is set.
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    /// Snapshot of all attributes as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.read().clone())
    }

    /// Set a property, notifying listeners if the value changed.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        match self.store(name, value.into()) {
            Some(event) => {
                self.emit_property(&event);
                self.changed.emit(event);
                true
            }
            None => false,
        }
    }

    /// Set several properties at once.
    ///
    /// All values are stored before any listener runs. Property listeners
    /// then fire in input order, followed by the general listeners. Returns
    /// the names of the properties that changed.
    pub fn set_many<I, K, V>(&self, values: I) -> Vec<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let events: Vec<ChangeEvent> = values
            .into_iter()
            .filter_map(|(name, value)| {
                let name: String = name.into();
                self.store(&name, value.into())
            })
            .collect();

        for event in &events {
            self.emit_property(event);
        }
        let changed = events.iter().map(|e| e.property.clone()).collect();
        for event in events {
            self.changed.emit(event);
        }
        changed
    }

    /// Set a property without notifying any listener.
    pub fn set_silent(&self, name: &str, value: impl Into<Value>) {
        self.attributes.write().insert(name.to_string(), value.into());
    }

    /// Remove a property, notifying listeners with a `None` value.
    ///
    /// Returns the removed value, if any.
    pub fn unset(&self, name: &str) -> Option<Value> {
        let previous = self.attributes.write().remove(name)?;
        let event = ChangeEvent {
            property: name.to_string(),
            value: None,
            previous: Some(previous.clone()),
        };
        self.emit_property(&event);
        self.changed.emit(event);
        Some(previous)
    }

    /// Remove every property, one change notification each.
    pub fn clear(&self) {
        for name in self.keys() {
            self.unset(&name);
        }
    }

    /// Listen for changes of a single property (`change:<name>`).
    pub fn on_change<F>(&self, name: &str, slot: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let signal = self
            .property_signals
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone();
        let connection = signal.connect(slot);
        tracing::trace!(target: targets::MODEL, property = name, "listener connected");
        ListenerId {
            property: Some(name.to_string()),
            connection,
        }
    }

    /// Listen for changes of any property (`change`).
    pub fn on_any_change<F>(&self, slot: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        ListenerId {
            property: None,
            connection: self.changed.connect(slot),
        }
    }

    /// Remove a single listener.
    ///
    /// Returns `true` if the listener was registered.
    pub fn off(&self, id: &ListenerId) -> bool {
        match &id.property {
            Some(name) => self
                .property_signal(name)
                .is_some_and(|signal| signal.disconnect(id.connection)),
            None => self.changed.disconnect(id.connection),
        }
    }

    /// Remove every change listener on every property, including general
    /// listeners.
    pub fn off_all_changes(&self) {
        let signals: Vec<_> = self.property_signals.lock().values().cloned().collect();
        for signal in signals {
            signal.disconnect_all();
        }
        self.changed.disconnect_all();
        tracing::debug!(target: targets::MODEL, "all change listeners removed");
    }

    /// Number of listeners observing a property.
    pub fn listener_count(&self, name: &str) -> usize {
        self.property_signal(name)
            .map_or(0, |signal| signal.connection_count())
    }

    /// Number of listeners of any kind.
    pub fn total_listener_count(&self) -> usize {
        let property: usize = self
            .property_signals
            .lock()
            .values()
            .map(|signal| signal.connection_count())
            .sum();
        property + self.changed.connection_count()
    }

    fn property_signal(&self, name: &str) -> Option<Arc<Signal<ChangeEvent>>> {
        self.property_signals.lock().get(name).cloned()
    }

    fn store(&self, name: &str, value: Value) -> Option<ChangeEvent> {
        let mut attributes = self.attributes.write();
        if attributes.get(name) == Some(&value) {
            return None;
        }
        let previous = attributes.insert(name.to_string(), value.clone());
        Some(ChangeEvent {
            property: name.to_string(),
            value: Some(value),
            previous,
        })
    }

    fn emit_property(&self, event: &ChangeEvent) {
        tracing::debug!(target: targets::MODEL, property = %event.property, "property changed");
        if let Some(signal) = self.property_signal(&event.property) {
            signal.emit(event.clone());
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("attributes", &*self.attributes.read())
            .field("listeners", &self.total_listener_count())
            .finish()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(model: &Model, name: &str) -> (ListenerId, Arc<Mutex<Vec<Option<Value>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let id = model.on_change(name, move |event| {
            seen_clone.lock().push(event.value.clone());
        });
        (id, seen)
    }

    #[test]
    fn test_set_notifies_only_on_change() {
        let model = Model::new();
        let (_, seen) = recorder(&model, "bar");

        assert!(model.set("bar", "someval"));
        assert!(!model.set("bar", "someval"));
        assert!(model.set("bar", 3));

        assert_eq!(*seen.lock(), vec![Some(json!("someval")), Some(json!(3))]);
    }

    #[test]
    fn test_property_listeners_are_scoped() {
        let model = Model::new();
        let (_, bar) = recorder(&model, "bar");
        let (_, foo) = recorder(&model, "foo");

        model.set("foo", 1);

        assert!(bar.lock().is_empty());
        assert_eq!(foo.lock().len(), 1);
    }

    #[test]
    fn test_change_event_carries_previous() {
        let model = Model::from_json(json!({"count": 1})).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        model.on_any_change(move |event| events_clone.lock().push(event.clone()));

        model.set("count", 2);

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous, Some(json!(1)));
        assert_eq!(events[0].value, Some(json!(2)));
    }

    #[test]
    fn test_set_silent_and_unset() {
        let model = Model::new();
        let (_, seen) = recorder(&model, "bar");

        model.set_silent("bar", "quiet");
        assert_eq!(model.get("bar"), Some(json!("quiet")));
        assert!(seen.lock().is_empty());

        assert_eq!(model.unset("bar"), Some(json!("quiet")));
        assert_eq!(model.unset("bar"), None);
        assert_eq!(*seen.lock(), vec![None]);
        assert!(!model.has("bar"));
    }

    #[test]
    fn test_set_many_stores_before_notifying() {
        let model = Arc::new(Model::new());
        let observed = Arc::new(Mutex::new(None));

        let model_clone = model.clone();
        let observed_clone = observed.clone();
        model.on_change("a", move |_| {
            *observed_clone.lock() = model_clone.get("b");
        });

        let changed = model.set_many([("a", json!(1)), ("b", json!(2)), ("c", json!(null))]);

        assert_eq!(changed, vec!["a", "b", "c"]);
        assert_eq!(*observed.lock(), Some(json!(2)));
    }

    #[test]
    fn test_off_removes_single_listener() {
        let model = Model::new();
        let (first, first_seen) = recorder(&model, "bar");
        let (_, second_seen) = recorder(&model, "bar");

        assert!(model.off(&first));
        assert!(!model.off(&first));
        model.set("bar", true);

        assert!(first_seen.lock().is_empty());
        assert_eq!(second_seen.lock().len(), 1);
        assert_eq!(model.listener_count("bar"), 1);
    }

    #[test]
    fn test_off_all_changes() {
        let model = Model::new();
        recorder(&model, "bar");
        recorder(&model, "foo");
        model.on_any_change(|_| {});
        assert_eq!(model.total_listener_count(), 3);

        model.off_all_changes();

        assert_eq!(model.total_listener_count(), 0);
    }

    #[test]
    fn test_listener_may_write_model() {
        let model = Arc::new(Model::new());
        let model_clone = model.clone();
        model.on_change("celsius", move |event| {
            if let Some(c) = event.value.as_ref().and_then(Value::as_f64) {
                model_clone.set("fahrenheit", c * 9.0 / 5.0 + 32.0);
            }
        });

        model.set("celsius", 100);

        assert_eq!(model.get("fahrenheit"), Some(json!(212.0)));
    }

    #[test]
    fn test_from_json_requires_object() {
        assert_eq!(
            Model::from_json(json!([1, 2])).unwrap_err(),
            ModelError::NotAnObject("an array")
        );
    }

    #[test]
    fn test_clear() {
        let model = Model::from_json(json!({"a": 1, "b": 2})).unwrap();
        let (_, seen) = recorder(&model, "a");

        model.clear();

        assert!(model.is_empty());
        assert_eq!(*seen.lock(), vec![None]);
    }
}
