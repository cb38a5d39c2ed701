use std::path::PathBuf;

use crate::http_log::LogCollection;

type AwaitingType = poll_promise::Promise<Box<LoadingStatus>>;

#[derive(Default)]
pub enum LoadingStatus {
    #[default]
    NotInProgress,
    InProgress(AwaitingType),
    Failed(String),
    Success(Box<LoadedFile>),
}

/// Result of a load that is ready to replace the displayed data
pub struct LoadedFile {
    pub path: PathBuf,
    pub collection: LogCollection,
}

/// Loads on tokio's blocking pool so the UI keeps painting
pub async fn load_in_background(path: PathBuf) -> LoadingStatus {
    let task = tokio::task::spawn_blocking(move || {
        LogCollection::load(&path).map(|collection| LoadedFile { path, collection })
    });
    match task.await {
        Ok(Ok(loaded)) => LoadingStatus::Success(Box::new(loaded)),
        Ok(Err(e)) => LoadingStatus::Failed(format!("{:#}", anyhow::Error::new(e))),
        Err(e) => LoadingStatus::Failed(format!("loading task failed: {e}")),
    }
}
