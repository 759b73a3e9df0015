use std::{
    path::PathBuf,
    sync::mpsc,
    thread,
};

use crate::core::{
    dataset::{
        Dataset,
        BUNDLED_CSV,
    },
    errors::RepasoError,
};

#[derive(Debug, Clone)]
pub enum DatasetSource {
    Bundled,
    File(PathBuf),
}

impl DatasetSource {
    pub fn label(&self) -> String {
        match self {
            DatasetSource::Bundled => "bundled review history".to_string(),
            DatasetSource::File(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("selected file")
                .to_string(),
        }
    }
}

pub enum TaskResult {
    DatasetLoaded { source: DatasetSource, result: Result<Dataset, String> },
    LoadingMessage(String),
}

/// Runs dataset parsing off the UI thread; results are polled each frame.
pub struct TaskManager {
    receiver: mpsc::Receiver<TaskResult>,
    sender: mpsc::Sender<TaskResult>,
}

impl TaskManager {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();

        Self { receiver, sender }
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }

        results
    }

    pub fn load_dataset(&self, source: DatasetSource) {
        let sender = self.sender.clone();

        thread::spawn(move || {
            let _ = sender
                .send(TaskResult::LoadingMessage(format!("Reading {}...", source.label())));

            let result = match &source {
                DatasetSource::Bundled => Dataset::from_csv(BUNDLED_CSV),
                DatasetSource::File(path) => std::fs::read_to_string(path)
                    .map_err(RepasoError::from)
                    .and_then(|text| Dataset::from_csv(&text)),
            };

            let _ = sender.send(TaskResult::DatasetLoaded {
                source,
                result: result.map_err(|e| e.to_string()),
            });
        });
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}
