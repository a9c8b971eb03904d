//! Host environment - how the core terminates the process

/// The process hosting the core.
///
/// `quit` calls [`HostEnvironment::exit`] after every plugin has stopped.
/// Implementations other than [`ProcessHost`] may return from `exit`.
pub trait HostEnvironment: Send + Sync {
    fn exit(&self);
}

/// Terminates the current process with a fixed exit code
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHost {
    code: i32,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(code: i32) -> Self {
        Self { code }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl HostEnvironment for ProcessHost {
    fn exit(&self) {
        tracing::info!(code = self.code, "Exiting");
        std::process::exit(self.code);
    }
}
