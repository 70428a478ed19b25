use crate::client::ApiClient;
use crate::domain::endpoints_controller::EndpointsController;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Creates an `EndpointsController` that updates the given client.
pub type ControllerFactory = Arc<dyn Fn(&ApiClient) -> Box<dyn EndpointsController> + Send + Sync>;

static CONTROLLER_REGISTRY: LazyLock<EndpointsControllerRegistry> = LazyLock::new(EndpointsControllerRegistry::new);

/// Maps endpoints controller names to the factories that create them.
///
/// A name can only be registered once, registering it again is a wiring defect and panics.
/// Every lookup invokes the factory again, constructed controllers are never cached.
#[derive(Default)]
pub struct EndpointsControllerRegistry {
    factories: Mutex<HashMap<String, ControllerFactory>>,
}

impl EndpointsControllerRegistry {
    pub fn new() -> Self {
        EndpointsControllerRegistry {
            factories: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a factory by name.
    ///
    /// # Panics
    ///
    /// Panics if a factory was already registered under `name`. Release builds abort on panic,
    /// so a duplicate registration terminates the process.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ApiClient) -> Box<dyn EndpointsController> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut factories = self.lock();
        if factories.contains_key(&name) {
            drop(factories);
            error!(controller = name, "💥 Endpoints controller {:?} was registered twice", name);
            panic!("Endpoints controller {:?} was registered twice", name);
        }

        factories.insert(name.clone(), Arc::new(factory));
        drop(factories);
        info!(controller = name, "Registered endpoints controller {:?}", name);
    }

    /// Creates an `EndpointsController` using the factory registered under `name`,
    /// or returns `None` if there is no such factory.
    pub fn get(&self, name: &str, client: &ApiClient) -> Option<Box<dyn EndpointsController>> {
        // Invoked outside the lock, construction may be slow
        let factory = self.lock().get(name).cloned()?;
        Some(factory(client))
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ControllerFactory>> {
        self.factories.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The process-wide registry, populated by `#[endpoints_controller]` factories before `main` runs.
pub fn global() -> &'static EndpointsControllerRegistry {
    &CONTROLLER_REGISTRY
}

pub fn register<F>(name: impl Into<String>, factory: F)
where
    F: Fn(&ApiClient) -> Box<dyn EndpointsController> + Send + Sync + 'static,
{
    global().register(name, factory);
}

pub fn get(name: &str, client: &ApiClient) -> Option<Box<dyn EndpointsController>> {
    global().get(name, client)
}

pub fn registered_names() -> Vec<String> {
    global().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::client::new_client;
    use crate::domain::endpoints_controller::SyncError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::any::Any;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use test_log::test;

    #[derive(Debug)]
    struct TestController {
        instance: usize,
    }

    #[async_trait]
    impl EndpointsController for TestController {
        async fn sync_service_endpoints(&self) -> Result<(), SyncError> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn client() -> ApiClient {
        new_client(&AppConfigBuilder::new().build()).expect("client should build")
    }

    fn counting_factory(counter: Arc<AtomicUsize>) -> impl Fn(&ApiClient) -> Box<dyn EndpointsController> + Send + Sync + 'static {
        move |_: &ApiClient| -> Box<dyn EndpointsController> {
            let instance = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Box::new(TestController { instance })
        }
    }

    fn instance_of(controller: &dyn EndpointsController) -> usize {
        controller
            .as_any()
            .downcast_ref::<TestController>()
            .expect("expected a TestController")
            .instance
    }

    #[test]
    fn get_returns_the_controller_created_by_the_registered_factory() {
        let registry = EndpointsControllerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register("test", counting_factory(counter.clone()));

        let controller = registry.get("test", &client()).expect("controller is None, want Some");

        assert_eq!(instance_of(controller.as_ref()), counter.load(Ordering::SeqCst));
    }

    #[test]
    fn get_invokes_the_factory_on_every_call() {
        let registry = EndpointsControllerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register("test", counting_factory(counter.clone()));
        let client = client();

        let first = registry.get("test", &client).expect("first controller");
        let second = registry.get("test", &client).expect("second controller");

        assert_eq!(instance_of(first.as_ref()), 1);
        assert_eq!(instance_of(second.as_ref()), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn get_returns_none_for_a_missing_controller_without_invoking_any_factory() {
        let registry = EndpointsControllerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register("test", counting_factory(counter.clone()));

        assert!(registry.get("nonexistent", &client()).is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn get_returns_none_on_an_empty_registry() {
        let registry = EndpointsControllerRegistry::new();

        assert!(registry.get("missing", &client()).is_none());
        assert!(registry.names().is_empty());
    }

    #[test]
    #[should_panic(expected = "Endpoints controller \"test\" was registered twice")]
    fn registering_a_name_twice_panics() {
        let registry = EndpointsControllerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        registry.register("test", counting_factory(counter.clone()));
        registry.register("test", counting_factory(counter));
    }

    #[test]
    fn duplicate_registration_keeps_the_original_factory_and_releases_the_lock() {
        let registry = EndpointsControllerRegistry::new();
        let original = Arc::new(AtomicUsize::new(0));
        let replacement = Arc::new(AtomicUsize::new(100));
        registry.register("test", counting_factory(original.clone()));

        let result = catch_unwind(AssertUnwindSafe(|| registry.register("test", counting_factory(replacement.clone()))));
        assert!(result.is_err(), "expected the duplicate registration to panic");

        let controller = registry.get("test", &client()).expect("original controller");
        assert_eq!(instance_of(controller.as_ref()), 1);
        assert_eq!(replacement.load(Ordering::SeqCst), 100);
        assert_eq!(registry.names(), vec!["test".to_string()]);
    }

    #[test]
    fn concurrent_registrations_of_distinct_names_are_all_retained() {
        const NUM_CONTROLLERS: usize = 64;
        let registry = Arc::new(EndpointsControllerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let handles = (0..NUM_CONTROLLERS)
            .map(|i| {
                let registry = registry.clone();
                let counter = counter.clone();
                thread::spawn(move || registry.register(format!("controller-{i}"), counting_factory(counter)))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("registration thread panicked");
        }

        let client = client();
        assert_eq!(registry.names().len(), NUM_CONTROLLERS);
        for i in 0..NUM_CONTROLLERS {
            assert!(registry.get(&format!("controller-{i}"), &client).is_some(), "controller-{i} is missing");
        }
    }

    #[test]
    fn names_are_sorted() {
        let registry = EndpointsControllerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for name in ["userspace", "ipaddress", "iptables"] {
            registry.register(name, counting_factory(counter.clone()));
        }

        assert_eq!(registry.names(), vec!["ipaddress", "iptables", "userspace"]);
    }

    #[test(tokio::test)]
    async fn registered_ip_address_controller_syncs_without_error() -> Result<(), SyncError> {
        let registry = EndpointsControllerRegistry::new();
        registry.register("ipaddress", |_: &ApiClient| -> Box<dyn EndpointsController> { Box::new(TestController { instance: 1 }) });

        let controller = registry.get("ipaddress", &client()).expect("controller is None, want Some");
        controller.sync_service_endpoints().await
    }
}
