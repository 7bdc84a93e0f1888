//! State shared between the driver and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chroma_core::commands::PlayerCommand;
use chroma_core::state::GameStateSnapshot;

use crate::error::AppError;
use crate::game_loop::LoopReport;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle to a running game loop.
///
/// `mpsc::Sender` is not `Sync`, so the handle is owned by one driver. The
/// latest snapshot sits behind `Arc<Mutex<..>>` for synchronous polling from
/// any thread.
pub struct LoopHandle {
    pub command_tx: mpsc::Sender<GameLoopCommand>,
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    pub(crate) thread: JoinHandle<Result<LoopReport, AppError>>,
}

impl LoopHandle {
    /// Forward a player command. Fails once the loop has exited.
    pub fn send(&self, command: PlayerCommand) -> Result<(), AppError> {
        self.command_tx
            .send(GameLoopCommand::PlayerCommand(command))
            .map_err(|_| AppError::LoopClosed)
    }

    /// Copy of the most recent snapshot, if a tick has run.
    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|s| s.clone())
    }

    /// Ask the loop to stop and wait for it.
    pub fn shutdown(self) -> Result<LoopReport, AppError> {
        // The loop may already have exited on its own.
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
        self.join()
    }

    /// Wait for the loop to finish on its own.
    pub fn join(self) -> Result<LoopReport, AppError> {
        self.thread.join().map_err(|_| AppError::LoopPanicked)?
    }
}
