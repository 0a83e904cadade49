use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use circular_buffer::CircularBuffer;
use tracing::{debug, warn};

pub type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

const ESCAPE: u8 = 27;
const BRACKET: u8 = 91;
const CTRL_C: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
}

/// Queue of discrete input events, drained once per tick.
pub trait InputSource {
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Turns the buffered bytes into events. An escape sequence that has not
/// fully arrived yet is left in the buffer.
pub fn decode_events(buffer: &mut InputBuffer) -> Vec<InputEvent> {
    let mut events = Vec::new();
    while let Some(&byte) = buffer.front() {
        if byte == ESCAPE {
            // arrows keys are long 3 bytes, first 2 need to be 27 and 91
            let Some(&second) = buffer.nth_front(1) else {
                break;
            };
            if second != BRACKET {
                buffer.pop_front();
                events.push(InputEvent::KeyDown(Key::Other(ESCAPE)));
                continue;
            }
            let Some(&third) = buffer.nth_front(2) else {
                break;
            };
            let key = match third {
                65 => Key::ArrowUp,
                66 => Key::ArrowDown,
                67 => Key::ArrowRight,
                68 => Key::ArrowLeft,
                other => Key::Other(other),
            };
            buffer.pop_front();
            buffer.pop_front();
            buffer.pop_front();
            events.push(InputEvent::KeyDown(key));
            continue;
        }
        buffer.pop_front();
        let event = match byte {
            b'q' | b'Q' | CTRL_C => InputEvent::Quit,
            b'w' | b'W' => InputEvent::KeyDown(Key::W),
            b'a' | b'A' => InputEvent::KeyDown(Key::A),
            b's' | b'S' => InputEvent::KeyDown(Key::S),
            b'd' | b'D' => InputEvent::KeyDown(Key::D),
            other => InputEvent::KeyDown(Key::Other(other)),
        };
        events.push(event);
    }
    events
}

/// Keyboard input read from stdin. The terminal must already be in
/// non-canonical mode for keys to arrive without enter.
pub struct TerminalInput {
    receiver: Receiver<u8>,
    buffer: InputBuffer,
    disconnected: bool,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        TerminalInput {
            receiver: spawn_stdin_channel(),
            buffer: InputBuffer::new(),
            disconnected: false,
        }
    }

    /// Moves every byte received so far into the buffer
    pub fn pump(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(byte) => {
                    // if the buffer is full, ignore the input
                    if !self.buffer.is_full() {
                        self.buffer.push_back(byte);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!("stdin reader stopped, no more input");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.pump();
        decode_events(&mut self.buffer)
    }
}

fn spawn_stdin_channel() -> Receiver<u8> {
    let (tx, rx) = mpsc::channel::<u8>();
    thread::spawn(move || {
        let mut reader = io::stdin();
        let mut buffer: [u8; 1] = [0; 1];
        loop {
            // read one u8 at a time from stdin
            if let Err(err) = reader.read_exact(&mut buffer) {
                debug!(%err, "stdin closed");
                return;
            }
            if tx.send(buffer[0]).is_err() {
                return;
            }
        }
    });
    rx
}

/// Replays a prepared list of events, one batch per poll.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        ScriptedInput {
            batches: batches.into(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.batches.pop_front().unwrap_or_default()
    }
}
