//! Build log streaming
//!
//! A [`LogStream`] polls the progressive log endpoint of one build on a background task
//! and delivers the output as [`LogEvent`]s. Polling continues, one fetch at a time with a
//! fixed delay in between, until the server reports no more data, a fetch fails or the
//! stream is ended by the caller.
//!
//! Exactly one terminal event is delivered: [`LogEvent::End`] or [`LogEvent::Error`].
//! After it, [`LogStream::next`] returns `None`.
//!
//! ```no_run
//! # use jenkins_client::{JenkinsClient, LogEvent};
//! # async fn example(client: JenkinsClient) -> anyhow::Result<()> {
//! let mut stream = client.build().log_stream("folder/test", 7, Default::default())?;
//!
//! while let Some(event) = stream.next().await {
//!     match event {
//!         LogEvent::Data(text) => print!("{text}"),
//!         LogEvent::End => break,
//!         LogEvent::Error(e) => return Err(e.into()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use jenkins_core::domain::build::BuildNumber;
use jenkins_core::domain::log::LogFormat;
use jenkins_core::dto::build::BuildLogOptions;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use crate::path::FolderPath;

/// Something observed while following a build log
#[derive(Debug)]
pub enum LogEvent {
    /// New log output
    Data(String),
    /// The build finished writing output, or the stream was ended
    End,
    /// A fetch failed; the stream is over
    Error(ClientError),
}

struct State {
    offset: u64,
    /// `None` once the stream has ended
    sender: Option<mpsc::UnboundedSender<LogEvent>>,
}

struct Shared {
    state: Mutex<State>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Follows the log of a running build
pub struct LogStream {
    events: mpsc::UnboundedReceiver<LogEvent>,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl LogStream {
    /// Starts polling on the current tokio runtime
    ///
    /// Fails when called outside a runtime.
    pub(crate) fn spawn(
        client: JenkinsClient,
        folder: FolderPath,
        number: BuildNumber,
        format: LogFormat,
        delay: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|_| ClientError::validation("log stream requires a tokio runtime"))?;

        let (sender, events) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                offset: 0,
                sender: Some(sender),
            }),
        });

        let task = runtime.spawn(poll(client, folder, number, format, delay, shared.clone()));

        Ok(Self {
            events,
            shared,
            task,
        })
    }

    /// Receive the next event; `None` after the terminal event
    pub async fn next(&mut self) -> Option<LogEvent> {
        self.events.recv().await
    }

    /// Stop polling
    ///
    /// Emits [`LogEvent::End`] unless the stream already ended; calling it again is a
    /// no-op. A fetch that was scheduled but had not started never runs.
    pub fn end(&self) {
        if let Some(sender) = self.shared.lock().sender.take() {
            debug!("log stream ended by caller");
            let _ = sender.send(LogEvent::End);
        }
        self.task.abort();
    }

    pub fn is_ended(&self) -> bool {
        self.shared.lock().sender.is_none()
    }

    /// Offset the next fetch will start from
    pub fn offset(&self) -> u64 {
        self.shared.lock().offset
    }
}

impl Stream for LogStream {
    type Item = LogEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll(
    client: JenkinsClient,
    folder: FolderPath,
    number: BuildNumber,
    format: LogFormat,
    delay: Duration,
    shared: Arc<Shared>,
) {
    loop {
        let start = shared.lock().offset;
        let options = BuildLogOptions {
            start: Some(start),
            format,
        };

        let result = client.build().log(folder.clone(), number.clone(), options).await;

        {
            let mut state = shared.lock();
            let Some(sender) = state.sender.as_ref() else {
                return;
            };

            match result {
                Ok(log) => {
                    if !log.text.is_empty() {
                        let _ = sender.send(LogEvent::Data(log.text));
                    }

                    if !log.more {
                        debug!(%folder, %number, "log stream finished");
                        let _ = sender.send(LogEvent::End);
                        state.sender = None;
                        return;
                    }

                    if let Some(size) = log.size {
                        state.offset = state.offset.max(size);
                    }
                }
                Err(e) => {
                    warn!(%folder, %number, error = %e, "log stream fetch failed");
                    let _ = sender.send(LogEvent::Error(e));
                    state.sender = None;
                    return;
                }
            }
        }

        tokio::time::sleep(delay).await;
    }
}
