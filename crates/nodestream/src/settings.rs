//! Hierarchical, scope-aware configuration shared by readers, writers and
//! transforms.
//!
//! A [`Settings`] handle is cheap to clone; clones share the same store. A
//! scope created with [`Settings::create_scope`] keeps local overrides and
//! reads through to its parent for anything it does not hold itself.
//!
//! # Examples
//!
//! ```
//! use nodestream::{Scalar, Settings};
//!
//! let parent = Settings::new();
//! parent.set("x", 1);
//! let scope = parent.create_scope();
//! scope.set("x", 2);
//! assert_eq!(parent.get("x"), Some(Scalar::Integer(1)));
//! assert_eq!(scope.get("x"), Some(Scalar::Integer(2)));
//!
//! scope.delete("x");
//! assert_eq!(scope.get("x"), Some(Scalar::Integer(1)));
//! ```
use alloc::{
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
use core::cell::RefCell;

use crate::{scalar::Scalar, text_case::TextCase};

#[derive(Debug, Default)]
struct Store {
    local: BTreeMap<String, Scalar>,
    fallback: Option<Settings>,
}

/// A shared, mutable bag of named settings.
///
/// Handles are single-threaded: they share their store through `Rc`, so a
/// settings tree can be derived and mutated from several pipeline stages at
/// once but never across threads.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    store: Rc<RefCell<Store>>,
}

impl Settings {
    /// Naming convention applied to payload names. See [`TextCase`].
    pub const TEXT_CASE: &'static str = "textCase";
    /// Treat a bare object or collection as the whole document.
    pub const IS_FRAGMENT: &'static str = "isFragment";
    /// Let codecs discard unmapped input instead of failing.
    pub const IS_LENIENT: &'static str = "isLenient";
    /// Culture used by codecs to format scalars.
    pub const CULTURE_INFO: &'static str = "cultureInfo";
    /// Date/time pattern used by codecs to format scalars.
    pub const DATE_TIME_FORMAT: &'static str = "dateTimeFormat";

    /// A fresh flat store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `name`, checking local overrides before each fallback in
    /// turn.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Scalar> {
        let mut current = self.clone();
        loop {
            let next = {
                let store = current.store.borrow();
                if let Some(value) = store.local.get(name) {
                    return Some(value.clone());
                }
                store.fallback.clone()
            };
            current = next?;
        }
    }

    /// Writes locally and returns the previous local value. A parent store
    /// is never touched.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.store
            .borrow_mut()
            .local
            .insert(name.into(), value.into())
    }

    /// Removes a local override, exposing the inherited value again.
    pub fn delete(&self, name: &str) -> Option<Scalar> {
        self.store.borrow_mut().local.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every visible name, local or inherited, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        let mut current = Some(self.clone());
        while let Some(settings) = current {
            let store = settings.store.borrow();
            names.extend(store.local.keys().cloned());
            current = store.fallback.clone();
        }
        names.into_iter().collect()
    }

    /// A child store that reads through to `self` and writes locally.
    #[must_use]
    pub fn create_scope(&self) -> Settings {
        Settings {
            store: Rc::new(RefCell::new(Store {
                local: BTreeMap::new(),
                fallback: Some(self.clone()),
            })),
        }
    }

    /// The store this scope falls back to, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Settings> {
        self.store.borrow().fallback.clone()
    }

    /// Materializes every visible value into a new flat store. Later changes
    /// to either side are not shared.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        let local = self
            .names()
            .into_iter()
            .filter_map(|name| self.get(&name).map(|value| (name, value)))
            .collect();
        Settings {
            store: Rc::new(RefCell::new(Store {
                local,
                fallback: None,
            })),
        }
    }

    /// Whether two handles share the same store.
    #[must_use]
    pub fn same_store(&self, other: &Settings) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    // ── typed accessors ─────────────────────────────────────────────────

    /// The configured naming convention. Unknown names resolve to
    /// [`TextCase::Unchanged`].
    #[must_use]
    pub fn text_case(&self) -> TextCase {
        match self.get(Self::TEXT_CASE) {
            Some(Scalar::String(s)) => s.parse().unwrap_or_else(|_err| {
                debug!(%s, "ignoring unknown text case");
                TextCase::Unchanged
            }),
            _ => TextCase::Unchanged,
        }
    }

    pub fn set_text_case(&self, case: TextCase) {
        self.set(Self::TEXT_CASE, case.to_string());
    }

    #[must_use]
    pub fn is_fragment(&self) -> bool {
        self.flag(Self::IS_FRAGMENT)
    }

    pub fn set_fragment(&self, on: bool) {
        self.set(Self::IS_FRAGMENT, on);
    }

    #[must_use]
    pub fn is_lenient(&self) -> bool {
        self.flag(Self::IS_LENIENT)
    }

    pub fn set_lenient(&self, on: bool) {
        self.set(Self::IS_LENIENT, on);
    }

    #[must_use]
    pub fn culture_info(&self) -> Option<String> {
        self.text(Self::CULTURE_INFO)
    }

    pub fn set_culture_info(&self, culture: impl Into<String>) {
        self.set(Self::CULTURE_INFO, culture.into());
    }

    #[must_use]
    pub fn date_time_format(&self) -> Option<String> {
        self.text(Self::DATE_TIME_FORMAT)
    }

    pub fn set_date_time_format(&self, format: impl Into<String>) {
        self.set(Self::DATE_TIME_FORMAT, format.into());
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Scalar::Boolean(true)))
    }

    fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}
