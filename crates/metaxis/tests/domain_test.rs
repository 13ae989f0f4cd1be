//! Integration tests for the process-wide domain.
//!
//! The domain is a singleton, so every test holds `DOMAIN_LOCK` and leaves
//! the domain uninitialized when it is done.

mod common;

use common::TestObject;
use metaxis::args;
use metaxis::runtime::{Domain, DomainArguments, MetaClass, MetaObject, invoke};
use metaxis_log::Level;
use parking_lot::Mutex;

static DOMAIN_LOCK: Mutex<()> = Mutex::new(());

/// Uninitializes the singleton domain on drop.
struct DomainGuard;

impl DomainGuard {
    fn initialize(arguments: &DomainArguments) -> Self {
        Domain::instance().initialize(arguments).unwrap();
        Self
    }
}

impl Drop for DomainGuard {
    fn drop(&mut self) {
        Domain::instance().uninitialize();
    }
}

#[test]
fn test_domain_has_object_factory() {
    let _lock = DOMAIN_LOCK.lock();
    let _domain = DomainGuard::initialize(&DomainArguments::default());

    assert!(Domain::instance().is_initialized());
    assert!(Domain::instance().object_factory().is_some());
}

#[test]
fn test_domain_object_factory_registry_content() {
    let _lock = DOMAIN_LOCK.lock();
    let _domain = DomainGuard::initialize(&DomainArguments::default());

    let factory = Domain::instance().object_factory().unwrap();
    assert_eq!(
        factory.find_by_name("meta.MetaObject"),
        Some(<dyn MetaObject>::static_meta_class())
    );
    assert!(factory.contains("meta.Object"));
}

#[test]
fn test_invoke_meta_object_get_name() {
    let _lock = DOMAIN_LOCK.lock();
    let _domain = DomainGuard::initialize(&DomainArguments::default());

    let object = <dyn MetaObject>::static_meta_class().create("object").unwrap();
    let result = invoke(&object, "getName", &args![]).unwrap();
    assert_eq!(result.get::<String>().unwrap(), "object");
}

#[test]
fn test_initialize_cycles_start_clean() {
    let _lock = DOMAIN_LOCK.lock();

    for _ in 0..3 {
        let _domain = DomainGuard::initialize(&DomainArguments::default());
        let factory = Domain::instance().object_factory().unwrap();
        assert_eq!(factory.len(), 2);

        factory.register(TestObject::static_meta_class()).unwrap();
        assert_eq!(factory.len(), 6);
    }

    assert!(!Domain::instance().is_initialized());
    assert!(Domain::instance().object_factory().is_none());
}

#[test]
fn test_factory_creates_registered_classes() {
    let _lock = DOMAIN_LOCK.lock();
    let _domain = DomainGuard::initialize(&DomainArguments::default());

    let factory = Domain::instance().object_factory().unwrap();
    factory.register(TestObject::static_meta_class()).unwrap();

    let object = factory.create("Object", "from-domain").unwrap();
    assert!(object.is::<TestObject>());
    invoke(&object, "Object.func", &args![]).unwrap();
    assert_eq!(object.downcast_ref::<TestObject>().unwrap().calls(), 1);
}

#[test]
fn test_log_level_argument() {
    let _lock = DOMAIN_LOCK.lock();
    let previous = metaxis_log::get_logger().level();

    let arguments = DomainArguments {
        log_level: Some(Level::Debug),
        ..DomainArguments::default()
    };
    let _domain = DomainGuard::initialize(&arguments);
    assert_eq!(metaxis_log::get_logger().level(), Level::Debug);

    metaxis_log::set_level(previous);
}

#[test]
fn test_arguments_from_env() {
    let _lock = DOMAIN_LOCK.lock();

    // SAFETY: DOMAIN_LOCK serializes every test in this binary that touches
    // the environment.
    unsafe { std::env::set_var(metaxis::runtime::domain::LOG_LEVEL_ENV, "warning") };
    assert_eq!(DomainArguments::from_env().log_level, Some(Level::Warn));

    unsafe { std::env::set_var(metaxis::runtime::domain::LOG_LEVEL_ENV, "loud") };
    assert_eq!(DomainArguments::from_env().log_level, None);

    unsafe { std::env::remove_var(metaxis::runtime::domain::LOG_LEVEL_ENV) };
    let arguments = DomainArguments::from_env();
    assert_eq!(arguments, DomainArguments::default());
    assert!(arguments.register_builtins);
}
