//! Async driver for the coordinator.
//!
//! Runs each [`Effect`] against a [`HistoryApi`] and feeds the result back as
//! an event, until the coordinator has nothing left to do. Requests are
//! awaited one at a time, so events are still handled strictly in order.

use std::path::Path;

use tracing::{debug, warn};

use super::coordinator::{Coordinator, CoordinatorSettings, Effect, Status, ViewEvent};
use crate::remote::HistoryApi;

pub struct Session<A: HistoryApi> {
    api: A,
    coordinator: Coordinator,
}

impl<A: HistoryApi> Session<A> {
    pub fn new(api: A, settings: CoordinatorSettings) -> Self {
        Self {
            api,
            coordinator: Coordinator::new(settings),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Upload an export and install its datasets.
    ///
    /// Returns the resulting status; a failed upload is reported there rather
    /// than as an error, and leaves no data installed.
    pub async fn upload(&mut self, path: &Path) -> Status {
        let effect = self.coordinator.handle(ViewEvent::UploadRequested);
        let Effect::Upload { id } = effect else {
            self.drive(effect).await;
            return self.coordinator.status();
        };

        let outcome = self
            .api
            .upload(path)
            .await
            .map(|payload| payload.into_datasets())
            .map_err(|e| e.user_message());

        let next = self
            .coordinator
            .handle(ViewEvent::UploadCompleted { id, outcome });
        self.drive(next).await;
        self.coordinator.status()
    }

    /// Handle one event and everything it triggers.
    pub async fn dispatch(&mut self, event: ViewEvent) {
        let effect = self.coordinator.handle(event);
        self.drive(effect).await;
    }

    async fn drive(&mut self, mut effect: Effect) {
        loop {
            effect = match effect {
                Effect::None => return,
                Effect::Upload { id } => {
                    // only `upload` knows which file to send
                    warn!(id, "Upload requested without a file");
                    self.coordinator.handle(ViewEvent::UploadCompleted {
                        id,
                        outcome: Err("No file selected".to_string()),
                    })
                }
                Effect::RemoteSort(request) => {
                    debug!(
                        id = request.id,
                        granularity = %request.granularity,
                        column = %request.spec.column,
                        direction = %request.spec.direction,
                        "Requesting remote sort"
                    );
                    let outcome = self
                        .api
                        .sort(&request)
                        .await
                        .map_err(|e| e.user_message());
                    self.coordinator
                        .handle(ViewEvent::RemoteSortCompleted { request, outcome })
                }
            };
        }
    }
}
