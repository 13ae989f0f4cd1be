//! Process-wide runtime domain.
//!
//! A [`Domain`] owns one [`ObjectFactory`] between `initialize` and
//! `uninitialize`. [`Domain::instance`] is the process singleton; separate
//! domains can be built with [`Domain::new`] where isolation matters.
//!
//! # Example
//!
//! ```rust
//! use metaxis::runtime::{Domain, DomainArguments};
//!
//! let domain = Domain::new();
//! domain.initialize(&DomainArguments::default()).unwrap();
//!
//! let factory = domain.object_factory().unwrap();
//! assert!(factory.contains("meta.MetaObject"));
//!
//! domain.uninitialize();
//! assert!(domain.object_factory().is_none());
//! ```

use crate::error::Result;
use crate::runtime::{MetaClass, Object, ObjectFactory};
use metaxis_log::{Level, info, warn};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// Environment variable read by [`DomainArguments::from_env`].
pub const LOG_LEVEL_ENV: &str = "METAXIS_LOG";

/// Domain configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainArguments {
    /// Register `meta.MetaObject` and `meta.Object` in the fresh factory.
    pub register_builtins: bool,
    /// Log level to apply on initialization; `None` leaves it unchanged.
    pub log_level: Option<Level>,
}

impl Default for DomainArguments {
    fn default() -> Self {
        Self {
            register_builtins: true,
            log_level: None,
        }
    }
}

impl DomainArguments {
    /// Defaults, with the log level taken from `METAXIS_LOG` when set.
    ///
    /// An unparsable level is logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|value| match Level::from_str(&value) {
                Ok(level) => Some(level),
                Err(err) => {
                    warn!("Ignoring {}: {}", LOG_LEVEL_ENV, err);
                    None
                }
            });

        Self {
            log_level,
            ..Self::default()
        }
    }
}

/// Lifecycle container for the object factory.
#[derive(Debug, Default)]
pub struct Domain {
    factory: RwLock<Option<Arc<ObjectFactory>>>,
}

impl Domain {
    /// Creates an uninitialized domain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide domain.
    pub fn instance() -> &'static Domain {
        static DOMAIN: OnceLock<Domain> = OnceLock::new();
        DOMAIN.get_or_init(Domain::new)
    }

    /// Installs a fresh object factory, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Propagates builtin registration failures; the domain is left
    /// unchanged in that case.
    pub fn initialize(&self, arguments: &DomainArguments) -> Result<()> {
        if let Some(level) = arguments.log_level {
            metaxis_log::set_level(level);
        }

        let factory = ObjectFactory::new();
        if arguments.register_builtins {
            factory.register(Object::static_meta_class())?;
        }

        let classes = factory.len();
        let previous = self.factory.write().replace(Arc::new(factory));
        if previous.is_some() {
            info!("Domain re-initialized with {} classes", classes);
        } else {
            info!("Domain initialized with {} classes", classes);
        }
        Ok(())
    }

    /// Drops the object factory.
    ///
    /// Factories already handed out stay usable until their last reference
    /// goes away.
    pub fn uninitialize(&self) {
        if self.factory.write().take().is_some() {
            info!("Domain uninitialized");
        }
    }

    /// Returns true between `initialize` and `uninitialize`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.factory.read().is_some()
    }

    /// The current object factory.
    #[must_use]
    pub fn object_factory(&self) -> Option<Arc<ObjectFactory>> {
        self.factory.read().clone()
    }
}
