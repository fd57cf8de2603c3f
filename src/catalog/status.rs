use std::sync::{Arc, Mutex};

/// Observer notified when a snapshot listener refreshes the catalog.
pub trait DataStatus: Send + Sync {
    fn on_data_updated(&self);

    fn on_error(&self, message: &str);
}

/// Closures receive `Ok(())` for an update and `Err(message)` for a failure.
impl<F> DataStatus for F
where
    F: Fn(Result<(), &str>) + Send + Sync,
{
    fn on_data_updated(&self) {
        self(Ok(()))
    }

    fn on_error(&self, message: &str) {
        self(Err(message))
    }
}

/// A status observer that logs notifications, or collects them in a buffer.
pub struct LogStatus {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStatus {
    pub fn new() -> Self {
        LogStatus { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogStatus {
            buffer: Some(buffer),
        }
    }

    fn write(&self, line: String) {
        match &self.buffer {
            Some(buffer) => {
                let mut lines = buffer.lock().unwrap_or_else(|poisoned| {
                    tracing::warn!("status buffer lock poisoned, recovering");
                    poisoned.into_inner()
                });
                lines.push(line);
            }
            None => tracing::info!("{}", line),
        }
    }
}

impl DataStatus for LogStatus {
    fn on_data_updated(&self) {
        self.write("[CATALOG] data updated".to_string());
    }

    fn on_error(&self, message: &str) {
        self.write(format!("[CATALOG] error: {}", message));
    }
}
