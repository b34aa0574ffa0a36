use crate::{Error, Result};
use tokio::sync::watch;

/// Commands the lookup coordinator sends to the fast producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProducerCommand {
    Run,
    Pause,
}

/// The fast producer's acknowledged execution state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProducerState {
    Running,
    Suspended,
}

/// Creates a connected [`PauseHandle`]/[`PauseGate`] pair.
///
/// The handle side commands suspend/resume; the gate side is owned by the
/// producer, which observes commands at its own tick boundary and
/// acknowledges state transitions. This keeps pause cooperative: no task
/// ever freezes another task's execution context directly.
pub fn pause_channel() -> (PauseHandle, PauseGate) {
    let (cmd_tx, cmd_rx) = watch::channel(ProducerCommand::Run);
    let (state_tx, state_rx) = watch::channel(ProducerState::Running);
    (
        PauseHandle { cmd_tx, state_rx },
        PauseGate { cmd_rx, state_tx },
    )
}

/// Controller side of a cooperative pause: commands the producer and
/// awaits its acknowledgment.
#[derive(Debug)]
pub struct PauseHandle {
    cmd_tx: watch::Sender<ProducerCommand>,
    state_rx: watch::Receiver<ProducerState>,
}

impl PauseHandle {
    /// Commands the producer to suspend and blocks until the suspension
    /// has taken effect.
    ///
    /// After this returns, the producer has stopped publishing and will
    /// not advance until [`resume`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the producer task is gone.
    ///
    /// [`resume`]: Self::resume
    pub async fn suspend(&mut self) -> Result<()> {
        self.cmd_tx
            .send(ProducerCommand::Pause)
            .map_err(|_| Error::ChannelClosed {
                context: "fast producer gone before suspend".to_owned(),
            })?;
        self.state_rx
            .wait_for(|state| *state == ProducerState::Suspended)
            .await
            .map_err(|_| Error::ChannelClosed {
                context: "fast producer gone awaiting suspend ack".to_owned(),
            })?;
        Ok(())
    }

    /// Commands the producer to resume. It picks back up on its next tick
    /// boundary, not mid-cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the producer task is gone.
    pub fn resume(&self) -> Result<()> {
        self.cmd_tx
            .send(ProducerCommand::Run)
            .map_err(|_| Error::ChannelClosed {
                context: "fast producer gone before resume".to_owned(),
            })
    }
}

/// Producer side of a cooperative pause.
///
/// The producer polls [`pause_requested`] at each tick boundary and, when
/// a pause is pending, parks in [`suspended`] until resumed.
///
/// [`pause_requested`]: Self::pause_requested
/// [`suspended`]: Self::suspended
#[derive(Debug)]
pub struct PauseGate {
    cmd_rx: watch::Receiver<ProducerCommand>,
    state_tx: watch::Sender<ProducerState>,
}

impl PauseGate {
    /// Returns `true` if a pause command is pending.
    pub fn pause_requested(&self) -> bool {
        *self.cmd_rx.borrow() == ProducerCommand::Pause
    }

    /// Acknowledges the pause and parks until the resume command.
    ///
    /// Sets the state to `Suspended` (unblocking the controller's
    /// [`PauseHandle::suspend`]), waits for `Run`, then restores
    /// `Running`. If the controller side is gone this returns so the
    /// producer does not park forever.
    pub async fn suspended(&mut self) {
        // Acks are best-effort: a dropped handle just means no one is
        // waiting on the transition anymore.
        let _ = self.state_tx.send(ProducerState::Suspended);
        let _ = self
            .cmd_rx
            .wait_for(|cmd| *cmd == ProducerCommand::Run)
            .await;
        let _ = self.state_tx.send(ProducerState::Running);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[tokio::test]
    async fn suspend_blocks_until_gate_acknowledges() {
        let (mut handle, mut gate) = pause_channel();

        let producer = tokio::spawn(async move {
            // Simulate one tick-boundary check.
            while !gate.pause_requested() {
                tokio::task::yield_now().await;
            }
            gate.suspended().await;
        });

        handle.suspend().await.unwrap();
        handle.resume().unwrap();
        producer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_does_not_return_before_ack() {
        let (mut handle, gate) = pause_channel();

        // No producer is servicing the gate, so suspend must still be
        // pending after a generous wait.
        let pending = tokio::time::timeout(Duration::from_secs(5), handle.suspend()).await;
        assert!(pending.is_err());
        drop(gate);
    }

    #[tokio::test]
    async fn suspend_errors_when_producer_is_gone() {
        let (mut handle, gate) = pause_channel();
        drop(gate);
        assert!(matches!(
            handle.suspend().await,
            Err(Error::ChannelClosed { .. })
        ));
    }
}
