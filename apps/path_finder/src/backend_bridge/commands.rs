//! Backend commands queued from UI to backend worker.

use shared::{domain::RequestId, protocol::PathsRequest};

#[derive(Debug, Clone)]
pub enum BackendCommand {
    FindPaths {
        request_id: RequestId,
        request: PathsRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FindPaths { .. } => "find_paths",
        }
    }
}
