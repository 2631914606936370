use thiserror::Error;
use tracing::{error, info, warn};

use crate::storage::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitializationResultType {
    #[default]
    None,
    Successful,
    SuccessfulWithErrors,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializationResult {
    pub kind: InitializationResultType,
    pub message: String,
}

impl InitializationResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn successful() -> Self {
        Self::with_kind(InitializationResultType::Successful, String::new())
    }

    pub fn successful_with_errors(message: impl Into<String>) -> Self {
        Self::with_kind(InitializationResultType::SuccessfulWithErrors, message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::with_kind(InitializationResultType::Failed, message.into())
    }

    fn with_kind(kind: InitializationResultType, message: String) -> Self {
        Self { kind, message }
    }

    pub fn was_successful(&self) -> bool {
        matches!(
            self.kind,
            InitializationResultType::Successful | InitializationResultType::SuccessfulWithErrors
        )
    }

    pub fn was_failed(&self) -> bool {
        self.kind == InitializationResultType::Failed
    }

    pub fn has_result(&self) -> bool {
        self.kind != InitializationResultType::None
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("{manager} failed to launch: {message}")]
    Launch {
        manager: &'static str,
        message: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A subsystem the [`Core`] brings up. `launch` loads state, `initialize`
/// finishes any setup that may partially fail, `dispose` tears down.
pub trait Manager {
    fn name(&self) -> &'static str;

    /// Lower values launch first.
    fn load_priority(&self) -> i32 {
        1
    }

    fn launch(&mut self) -> Result<(), ManagerError> {
        Ok(())
    }

    fn initialize(&mut self) -> InitializationResult {
        InitializationResult::successful()
    }

    fn dispose(&mut self) {}
}

/// The explicit list of managers a [`Core`] drives, in declaration order.
pub trait ManagerSet {
    fn managers_mut(&mut self) -> Vec<&mut dyn Manager>;
}

#[derive(Debug, Clone)]
struct ManagerRecord {
    /// Position in [`ManagerSet::managers_mut`].
    index: usize,
    name: &'static str,
    launched: bool,
    result: InitializationResult,
}

/// Brings a [`ManagerSet`] up in load-priority order and down in reverse.
#[derive(Debug)]
pub struct Core<S: ManagerSet> {
    managers: S,
    records: Vec<ManagerRecord>,
    is_initialized: bool,
}

impl<S: ManagerSet> Core<S> {
    pub fn new(managers: S) -> Self {
        Self {
            managers,
            records: Vec::new(),
            is_initialized: false,
        }
    }

    pub fn managers(&self) -> &S {
        &self.managers
    }

    pub fn managers_mut(&mut self) -> &mut S {
        &mut self.managers
    }

    pub fn into_managers(self) -> S {
        self.managers
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn has_launched(&self, name: &str) -> bool {
        self.record(name).is_some_and(|record| record.launched)
    }

    pub fn initialization_result(&self, name: &str) -> Option<&InitializationResult> {
        self.record(name).map(|record| &record.result)
    }

    /// Names in launch order.
    pub fn launch_order(&self) -> Vec<&'static str> {
        self.records.iter().map(|record| record.name).collect()
    }

    fn record(&self, name: &str) -> Option<&ManagerRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn start(&mut self) {
        if self.is_initialized {
            return;
        }
        info!("core_initializing");

        let mut managers = self.managers.managers_mut();
        let mut order = (0..managers.len()).collect::<Vec<_>>();
        order.sort_by_key(|&index| managers[index].load_priority());

        for index in order {
            let name = managers[index].name();
            if self.records.iter().any(|record| record.name == name) {
                warn!(manager = name, "manager_already_loaded_skipping");
                continue;
            }
            self.records.push(ManagerRecord {
                index,
                name,
                launched: false,
                result: InitializationResult::none(),
            });
        }

        info!(count = self.records.len(), "managers_launching");
        for record in &mut self.records {
            match managers[record.index].launch() {
                Ok(()) => {
                    record.launched = true;
                    info!(manager = record.name, "manager_launched");
                }
                Err(launch_error) => {
                    error!(
                        manager = record.name,
                        error = %launch_error,
                        "manager_launch_failed"
                    );
                    record.result = InitializationResult::failed(launch_error.to_string());
                }
            }
        }

        info!("managers_initializing");
        for record in &mut self.records {
            if !record.launched || record.result.was_successful() {
                continue;
            }
            let result = managers[record.index].initialize();
            if result.was_failed() {
                warn!(
                    manager = record.name,
                    message = %result.message,
                    "manager_initialize_failed"
                );
            } else if result.has_message() {
                warn!(
                    manager = record.name,
                    message = %result.message,
                    "manager_initialized_with_errors"
                );
            } else {
                info!(manager = record.name, "manager_initialized");
            }
            record.result = result;
        }

        self.is_initialized = true;
        info!("core_initialized");
    }

    /// Disposes launched managers in reverse launch order and resets their
    /// lifecycle so a later `start` brings them up again.
    pub fn dispose(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let mut managers = self.managers.managers_mut();
        for record in self.records.iter().rev() {
            if !record.launched {
                continue;
            }
            if let Some(manager) = managers.get_mut(record.index) {
                manager.dispose();
                info!(manager = record.name, "manager_disposed");
            }
        }
        self.records.clear();
        self.is_initialized = false;
    }
}
