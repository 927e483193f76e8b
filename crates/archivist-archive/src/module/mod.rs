//! Capability registries for materialised plugin payloads.
//!
//! A plugin archive's payload names a module. When the payload is loaded the
//! module is materialised into a [`PluginModule`]: a table from fully
//! qualified type names to [`ModuleType`] entries. Each entry carries the
//! zero-argument constructors for the capabilities the type implements, so
//! activation becomes a lookup instead of runtime name resolution.
//!
//! Modules are linked into the host ahead of time and listed in a
//! [`ModuleCatalog`]; the archive payload only selects one of them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ArchiveError, InstantiateError};

/// Error type plugin constructors may return.
pub type ActivationError = Box<dyn std::error::Error + Send + Sync>;

type Constructor = Arc<dyn Fn() -> Result<Box<dyn Any>, ActivationError> + Send + Sync>;
type ModuleFactory = Arc<dyn Fn() -> PluginModule + Send + Sync>;

/// A named contract the host consumes and plugins implement.
///
/// The loader never defines capabilities itself; hosts declare them by
/// implementing this trait on a marker type.
///
/// # Example
///
/// ```
/// use archivist_archive::Capability;
///
/// pub trait LogAnalyser {
///     fn analyse(&self, line: &str) -> bool;
/// }
///
/// pub struct LogAnalyserCapability;
///
/// impl Capability for LogAnalyserCapability {
///     const NAME: &'static str = "LogAnalyser";
///     type Instance = dyn LogAnalyser;
/// }
/// ```
pub trait Capability: 'static {
    /// Name under which archives declare implementations.
    const NAME: &'static str;
    /// Object handed to the host on activation, usually a trait object.
    type Instance: ?Sized + 'static;
}

/// Runtime identity of a concrete Rust type registered by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    rust_name: &'static str,
}

impl TypeDescriptor {
    /// Describes `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the described type.
    #[must_use]
    pub const fn id(self) -> TypeId {
        self.id
    }

    /// Returns the compiler-provided type name.
    #[must_use]
    pub const fn rust_name(self) -> &'static str {
        self.rust_name
    }
}

/// A type exported by a plugin module.
pub struct ModuleType {
    full_name: String,
    descriptor: Option<TypeDescriptor>,
    constructors: HashMap<&'static str, Constructor>,
}

impl ModuleType {
    fn new(full_name: String) -> Self {
        Self {
            full_name,
            descriptor: None,
            constructors: HashMap::new(),
        }
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the runtime descriptor, present for serialisable types.
    #[must_use]
    pub const fn descriptor(&self) -> Option<TypeDescriptor> {
        self.descriptor
    }

    /// Returns `true` when the type exports a constructor for `capability`.
    #[must_use]
    pub fn implements(&self, capability: &str) -> bool {
        self.constructors.contains_key(capability)
    }

    /// Instantiates the type as capability `C` using its zero-argument
    /// constructor.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiateError::NotImplemented`] when the type exports no
    /// constructor for `C`, [`InstantiateError::Constructor`] when the
    /// plugin's constructor fails, and [`InstantiateError::TypeMismatch`] when
    /// the constructor was registered for a different instance type.
    pub fn instantiate<C: Capability>(&self) -> Result<Box<C::Instance>, InstantiateError> {
        let constructor =
            self.constructors
                .get(C::NAME)
                .ok_or_else(|| InstantiateError::NotImplemented {
                    type_name: self.full_name.clone(),
                    capability: C::NAME,
                })?;

        let instance = constructor().map_err(|source| InstantiateError::Constructor {
            type_name: self.full_name.clone(),
            source,
        })?;

        instance
            .downcast::<Box<C::Instance>>()
            .map(|boxed| *boxed)
            .map_err(|_| InstantiateError::TypeMismatch {
                type_name: self.full_name.clone(),
                capability: C::NAME,
            })
    }
}

impl fmt::Debug for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities: Vec<&&str> = self.constructors.keys().collect();
        capabilities.sort();
        f.debug_struct("ModuleType")
            .field("full_name", &self.full_name)
            .field("descriptor", &self.descriptor)
            .field("capabilities", &capabilities)
            .finish()
    }
}

/// Materialised payload of a plugin archive.
///
/// # Example
///
/// ```
/// use archivist_archive::{Capability, PluginModule};
///
/// trait Greeter {
///     fn greet(&self) -> String;
/// }
///
/// struct GreeterCapability;
/// impl Capability for GreeterCapability {
///     const NAME: &'static str = "Greeter";
///     type Instance = dyn Greeter;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let module = PluginModule::builder("greetings")
///     .export::<GreeterCapability, _>("Greetings.English", || Box::new(English))
///     .build();
///
/// let ty = module.resolve_type("Greetings.English").unwrap();
/// let greeter = ty.instantiate::<GreeterCapability>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct PluginModule {
    name: String,
    types: HashMap<String, ModuleType>,
}

impl PluginModule {
    /// Starts building a module with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            name: name.into(),
            types: HashMap::new(),
        }
    }

    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Looks up a type by its fully qualified name.
    #[must_use]
    pub fn resolve_type(&self, full_name: &str) -> Option<&ModuleType> {
        self.types.get(full_name)
    }

    /// Returns the number of exported types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` when the module exports nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field("types", &names)
            .finish()
    }
}

/// Builder assembling a [`PluginModule`].
pub struct ModuleBuilder {
    name: String,
    types: HashMap<String, ModuleType>,
}

impl ModuleBuilder {
    /// Exports `type_name` as an implementation of capability `C`.
    #[must_use]
    pub fn export<C, F>(self, type_name: impl Into<String>, constructor: F) -> Self
    where
        C: Capability,
        F: Fn() -> Box<C::Instance> + Send + Sync + 'static,
    {
        self.try_export::<C, _>(type_name, move || Ok(constructor()))
    }

    /// Exports `type_name` with a constructor that may fail.
    #[must_use]
    pub fn try_export<C, F>(mut self, type_name: impl Into<String>, constructor: F) -> Self
    where
        C: Capability,
        F: Fn() -> Result<Box<C::Instance>, ActivationError> + Send + Sync + 'static,
    {
        let erased: Constructor =
            Arc::new(move || constructor().map(|instance| Box::new(instance) as Box<dyn Any>));
        self.entry(type_name.into())
            .constructors
            .insert(C::NAME, erased);
        self
    }

    /// Registers `T` as a serialisable type under `type_name`.
    ///
    /// Only names registered here carry a [`TypeDescriptor`]; a type exported
    /// solely as a capability implementation does not.
    #[must_use]
    pub fn serializable<T: 'static>(mut self, type_name: impl Into<String>) -> Self {
        self.entry(type_name.into()).descriptor = Some(TypeDescriptor::of::<T>());
        self
    }

    /// Finishes the module.
    #[must_use]
    pub fn build(self) -> PluginModule {
        PluginModule {
            name: self.name,
            types: self.types,
        }
    }

    fn entry(&mut self, type_name: String) -> &mut ModuleType {
        self.types
            .entry(type_name)
            .or_insert_with_key(|key| ModuleType::new(key.clone()))
    }
}

/// Host-side table of the plugin modules linked into the binary.
///
/// Archive payloads carry a module key; materialising the payload runs the
/// factory registered under that key.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module factory under `key`, replacing any previous one.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> PluginModule + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Arc::new(factory));
    }

    /// Builder-style variant of [`Self::register`].
    #[must_use]
    pub fn with_module<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> PluginModule + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    /// Returns `true` when a module is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Builds the module registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnknownModule`] when no factory is registered.
    pub fn materialize(&self, key: &str) -> Result<PluginModule, ArchiveError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ArchiveError::UnknownModule {
                key: key.to_owned(),
            })?;
        Ok(factory())
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("ModuleCatalog").field("modules", &keys).finish()
    }
}

#[cfg(test)]
mod tests;
