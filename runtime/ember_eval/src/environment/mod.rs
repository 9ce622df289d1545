//! Lexical scope chain.
//!
//! An [`Environment`] is one link in a singly-linked chain of scopes. Links
//! are shared: a closure keeps the link that was active when it was created
//! alive for as long as the closure itself lives.

use std::fmt;
use std::sync::Arc;

use ember_ir::Ident;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::context::ScriptContext;
use crate::function::FunctionValue;
use crate::table::Table;
use crate::value::Value;

struct EnvNode {
    enclosing: Option<Environment>,
    bindings: RwLock<FxHashMap<Ident, Value>>,
    context: ScriptContext,
}

/// Shared reference to one scope link.
#[derive(Clone)]
pub struct Environment(Arc<EnvNode>);

impl Environment {
    /// Empty root scope.
    pub fn new(context: ScriptContext) -> Self {
        Environment(Arc::new(EnvNode {
            enclosing: None,
            bindings: RwLock::new(FxHashMap::default()),
            context,
        }))
    }

    /// Root scope seeded with the standard globals (`math`).
    pub fn create(context: ScriptContext) -> Self {
        let env = Self::new(context);
        let mut math = Table::new();
        math.set_field("pi", Value::Float(std::f64::consts::PI));
        math.set_field("e", Value::Float(std::f64::consts::E));
        let math = env.context().new_table(math);
        env.set_value(Ident::from_name("math"), Value::Table(math));
        env
    }

    /// New empty scope enclosed by this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment(Arc::new(EnvNode {
            enclosing: Some(self.clone()),
            bindings: RwLock::new(FxHashMap::default()),
            context: self.0.context.clone(),
        }))
    }

    pub fn enclosing(&self) -> Option<&Environment> {
        self.0.enclosing.as_ref()
    }

    pub fn context(&self) -> &ScriptContext {
        &self.0.context
    }

    /// Bind in this link only.
    pub fn set_value(&self, id: Ident, value: Value) {
        self.0.bindings.write().insert(id, value);
    }

    /// Read from this link only.
    ///
    /// A missing identifier that names a registered native yields that
    /// native without binding it; any other missing identifier is bound
    /// to nil on first read.
    pub fn get_value(&self, id: Ident) -> Value {
        if let Some(value) = self.0.bindings.read().get(&id) {
            return value.clone();
        }
        if let Some(native) = self.context().natives().lookup(id) {
            return Value::Function(FunctionValue::Native(native));
        }
        self.0.bindings.write().entry(id).or_default().clone()
    }

    /// Link `distance` hops up the chain, or the root if the chain is
    /// shorter.
    pub fn ancestor(&self, distance: u32) -> &Environment {
        let mut env = self;
        for _ in 0..distance {
            match env.enclosing() {
                Some(parent) => env = parent,
                None => break,
            }
        }
        env
    }

    pub fn set_value_at(&self, distance: u32, id: Ident, value: Value) {
        self.ancestor(distance).set_value(id, value);
    }

    pub fn get_value_at(&self, distance: u32, id: Ident) -> Value {
        self.ancestor(distance).get_value(id)
    }

    /// Root of the chain; `self` if this link is the root.
    pub fn global_environment(&self) -> &Environment {
        let mut env = self;
        while let Some(parent) = env.enclosing() {
            env = parent;
        }
        env
    }

    /// Identifiers bound in this link.
    pub fn identifiers(&self) -> Vec<Ident> {
        self.0.bindings.read().keys().copied().collect()
    }

    /// Whether this link binds `id`. Does not consult natives.
    pub fn contains(&self, id: Ident) -> bool {
        self.0.bindings.read().contains_key(&id)
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut env = self;
        while let Some(parent) = env.enclosing() {
            depth += 1;
            env = parent;
        }
        depth
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("bindings", &self.0.bindings.read().len())
            .finish()
    }
}
