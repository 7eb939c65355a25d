use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Clock and countdown refresh
    Tick,
    /// Time to hand the notification worker a fresh snapshot
    Schedule,
}

/// Terminal input plus two independent timers, all on one thread.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration, schedule_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            let mut last_schedule = Instant::now();
            loop {
                let next_tick = tick_rate.saturating_sub(last_tick.elapsed());
                let next_schedule = schedule_rate.saturating_sub(last_schedule.elapsed());
                let timeout = next_tick.min(next_schedule);

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }

                if last_schedule.elapsed() >= schedule_rate {
                    if tx.send(Event::Schedule).is_err() {
                        break;
                    }
                    last_schedule = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
