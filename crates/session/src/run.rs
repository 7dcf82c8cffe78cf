// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session run loop: binds a session to a live log source.

use crate::session::TestSession;
use crate::source::{DeviceGroupReassigner, LogSource, SourceSignal};
use rig_core::{DeviceId, EventSink, SessionError, SessionEvent};
use rig_exec::CommandExecutor;
use tracing::{debug, info, warn};

impl TestSession {
    /// Drive this session from `source` until it stops.
    ///
    /// Signals map onto the session as follows: `Ready` fires the
    /// device-group reassignment hook, `Record` dispatches through
    /// [`TestSession::handle_record`], `Error` is forwarded verbatim as a
    /// session error, and `Done` (or source exhaustion) stops the session.
    /// A thrown dispatch error marks the session failed, surfaces as an
    /// `Error` event, and ends the run. Exactly one `Done` event is emitted
    /// per session. Once the session is stopped, the source is told to stop
    /// its own production loop.
    pub async fn run<S, E>(
        &mut self,
        device: &DeviceId,
        source: &mut S,
        executor: &E,
        reassigner: Option<&dyn DeviceGroupReassigner>,
        sink: &mut dyn EventSink,
    ) where
        S: LogSource,
        E: CommandExecutor + ?Sized,
    {
        info!(session_id = %self.id(), device_id = %device, "session run started");

        while !self.is_stopped() {
            let Some(signal) = source.next().await else {
                self.stop(sink);
                break;
            };

            match signal {
                SourceSignal::Ready => {
                    if let Some(hook) = reassigner {
                        if let Err(error) = hook.reassign(device).await {
                            warn!(
                                session_id = %self.id(),
                                device_id = %device,
                                error = %error,
                                "device group reassignment failed"
                            );
                        }
                    }
                }
                SourceSignal::Record(record) => {
                    if let Err(thrown) = self.handle_record(&record, executor, sink).await {
                        let error = thrown.into_session_error();
                        self.error = true;
                        sink.emit(SessionEvent::Error {
                            session: self.id().clone(),
                            error,
                        });
                        self.stop(sink);
                    }
                }
                SourceSignal::Error(message) => {
                    sink.emit(SessionEvent::Error {
                        session: self.id().clone(),
                        error: SessionError::LogSource { message },
                    });
                }
                SourceSignal::Done => self.stop(sink),
            }
        }

        source.stop().await;
        debug!(session_id = %self.id(), "log source stopped");
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
