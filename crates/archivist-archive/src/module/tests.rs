//! Unit tests for module capability registries.

use rstest::{fixture, rstest};

use super::*;

trait Counter {
    fn count(&self) -> usize;
}

trait Labeller {
    fn label(&self) -> String;
}

struct CounterCapability;

impl Capability for CounterCapability {
    const NAME: &'static str = "Counter";
    type Instance = dyn Counter;
}

struct LabellerCapability;

impl Capability for LabellerCapability {
    const NAME: &'static str = "Labeller";
    type Instance = dyn Labeller;
}

/// Declares the `Counter` name but hands out a different instance type.
struct ImpostorCapability;

impl Capability for ImpostorCapability {
    const NAME: &'static str = "Counter";
    type Instance = dyn Labeller;
}

struct Fixed(usize);

impl Counter for Fixed {
    fn count(&self) -> usize {
        self.0
    }
}

impl Labeller for Fixed {
    fn label(&self) -> String {
        format!("fixed-{}", self.0)
    }
}

struct Settings;

fn counters_module() -> PluginModule {
    PluginModule::builder("counters")
        .export::<CounterCapability, _>("Counters.Three", || Box::new(Fixed(3)))
        .export::<LabellerCapability, _>("Counters.Three", || Box::new(Fixed(3)))
        .try_export::<CounterCapability, _>("Counters.Broken", || Err("no licence".into()))
        .serializable::<Settings>("Counters.Settings")
        .build()
}

#[fixture]
fn module() -> PluginModule {
    counters_module()
}

#[rstest]
fn resolves_exported_types(module: PluginModule) {
    assert_eq!(module.name(), "counters");
    assert_eq!(module.len(), 3);
    assert!(module.resolve_type("Counters.Three").is_some());
    assert!(module.resolve_type("Counters.Missing").is_none());
}

#[rstest]
fn instantiates_each_exported_capability(module: PluginModule) {
    let ty = module.resolve_type("Counters.Three").expect("type resolves");
    assert!(ty.implements("Counter"));
    assert!(ty.implements("Labeller"));

    let counter = ty
        .instantiate::<CounterCapability>()
        .expect("counter instantiates");
    assert_eq!(counter.count(), 3);

    let labeller = ty
        .instantiate::<LabellerCapability>()
        .expect("labeller instantiates");
    assert_eq!(labeller.label(), "fixed-3");
}

#[rstest]
fn each_instantiation_creates_a_fresh_instance(module: PluginModule) {
    let ty = module.resolve_type("Counters.Three").expect("type resolves");
    let first = ty.instantiate::<CounterCapability>().expect("first");
    let second = ty.instantiate::<CounterCapability>().expect("second");
    assert!(!std::ptr::addr_eq(&raw const *first, &raw const *second));
}

#[rstest]
fn reports_missing_capability(module: PluginModule) {
    let ty = module
        .resolve_type("Counters.Settings")
        .expect("type resolves");
    let error = ty
        .instantiate::<CounterCapability>()
        .err()
        .expect("settings is not a counter");
    assert!(matches!(error, InstantiateError::NotImplemented { .. }));
}

#[rstest]
fn reports_constructor_failure(module: PluginModule) {
    let ty = module.resolve_type("Counters.Broken").expect("type resolves");
    let error = ty
        .instantiate::<CounterCapability>()
        .err()
        .expect("constructor fails");
    assert!(matches!(error, InstantiateError::Constructor { .. }));
    assert!(error.to_string().contains("no licence"));
}

#[rstest]
fn reports_instance_type_mismatch(module: PluginModule) {
    let ty = module.resolve_type("Counters.Three").expect("type resolves");
    let error = ty
        .instantiate::<ImpostorCapability>()
        .err()
        .expect("instance type differs");
    assert!(matches!(error, InstantiateError::TypeMismatch { .. }));
}

#[rstest]
fn serializable_types_carry_descriptors(module: PluginModule) {
    let ty = module
        .resolve_type("Counters.Settings")
        .expect("type resolves");
    let descriptor = ty.descriptor().expect("descriptor present");
    assert_eq!(descriptor.id(), TypeId::of::<Settings>());
    assert!(descriptor.rust_name().ends_with("Settings"));

    let exported = module.resolve_type("Counters.Three").expect("type resolves");
    assert!(exported.descriptor().is_none());
}

#[test]
fn catalog_materialises_registered_modules() {
    let catalog = ModuleCatalog::new().with_module("counters", counters_module);
    assert!(catalog.contains("counters"));
    assert_eq!(catalog.len(), 1);

    let materialised = catalog.materialize("counters").expect("module builds");
    assert_eq!(materialised.name(), "counters");
}

#[test]
fn catalog_rejects_unknown_keys() {
    let catalog = ModuleCatalog::new();
    assert!(catalog.is_empty());
    let error = catalog
        .materialize("nonexistent")
        .expect_err("unknown key should fail");
    assert!(matches!(error, ArchiveError::UnknownModule { .. }));
}

#[test]
fn debug_output_lists_type_names() {
    let rendered = format!("{:?}", counters_module());
    assert!(rendered.contains("Counters.Three"), "{rendered}");
}
