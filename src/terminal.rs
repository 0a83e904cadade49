use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;
use termios::{tcflag_t, tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::display::TerminalDisplay;
use crate::game::{Control, Game, Phase};
use crate::input::TerminalInput;

const STDIN_FD: i32 = 0;
// how long to nap between input pumps while waiting for the next tick
const POLL_INTERVAL: Duration = Duration::from_millis(3);

/// Local mode flags while playing: keys arrive one byte at a time, unechoed,
/// and Ctrl-C is read as a byte so quitting goes through `release`.
fn game_lflag(lflag: tcflag_t) -> tcflag_t {
    lflag & !(ICANON | ECHO | ISIG)
}

/// Everything the game needs from the terminal, set up in one place and put
/// back the way it was on release.
pub struct TerminalContext {
    pub display: TerminalDisplay,
    pub input: TerminalInput,
    old_termios: Termios,
    released: bool,
}

impl TerminalContext {
    pub fn init(config: &GameConfig) -> Result<Self> {
        let old_termios = Termios::from_fd(STDIN_FD).context("stdin is not a terminal")?;
        let mut new_termios = old_termios;
        new_termios.c_lflag = game_lflag(new_termios.c_lflag);
        tcsetattr(STDIN_FD, TCSANOW, &new_termios).context("Failed to set terminal mode")?;
        debug!("terminal switched to non-canonical mode");
        Ok(TerminalContext {
            display: TerminalDisplay::new(config),
            input: TerminalInput::spawn(),
            old_termios,
            released: false,
        })
    }

    /// Puts stdin back in its original mode. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        tcsetattr(STDIN_FD, TCSANOW, &self.old_termios)
            .context("Failed to restore terminal mode")?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Drop for TerminalContext {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("{err:#}");
        }
    }
}

/// Runs the game until it ends, one tick per `tick_duration`. A quit key
/// restores the terminal and exits the process right away.
pub fn play<R: Rng>(game: &mut Game<R>, context: &mut TerminalContext) -> Result<()> {
    let tick = game.config().tick_duration();
    game.render(&mut context.display)?;
    let mut frame_start_time = Instant::now();
    loop {
        context.input.pump();
        if frame_start_time.elapsed() < tick {
            // wait for next frame
            std::thread::sleep(POLL_INTERVAL);
            continue;
        }
        frame_start_time = Instant::now();
        if game.tick(&mut context.input, &mut context.display)? == Control::Quit {
            info!("quit requested");
            context.release()?;
            std::process::exit(0);
        }
        if game.phase() == Phase::Ended {
            info!(reason = ?game.end_reason(), winner = ?game.winner(), "game over");
            break;
        }
    }
    context.release()
}
