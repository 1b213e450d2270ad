use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The single-threaded pump behind a dashboard session.
///
/// Every input event and every idle tick goes through one handler on the
/// calling thread. API requests complete on a worker thread, but their
/// results are only picked up by the handler's idle tick, so the document
/// is never touched concurrently.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs until the handler answers `Quit`.
    ///
    /// The handler sees `None` once per iteration (tick and redraw) and
    /// `Some(event)` for each pending input event.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (drags, wheel) before the next redraw so the
                // sheet keeps up with the pointer.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedInput;
    use crossterm::event::KeyCode;

    #[test]
    fn drains_queued_events_between_ticks() {
        let mut input = ScriptedInput::new();
        input.text("abc");
        let mut event_loop = EventLoop::new(input, Duration::ZERO);
        let mut ticks = 0;
        let mut keys = Vec::new();
        event_loop
            .run(|_, event| {
                match event {
                    None => {
                        ticks += 1;
                        if ticks == 3 {
                            return Ok(ControlFlow::Quit);
                        }
                    }
                    Some(Event::Key(key)) => keys.push(key.code),
                    Some(_) => {}
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(
            keys,
            vec![KeyCode::Char('a'), KeyCode::Char('b'), KeyCode::Char('c')]
        );
        assert_eq!(ticks, 3);
    }

    #[test]
    fn quit_from_an_event_stops_immediately() {
        let mut input = ScriptedInput::new();
        input.text("qz");
        let mut event_loop = EventLoop::new(input, Duration::ZERO);
        event_loop
            .run(|_, event| {
                Ok(match event {
                    Some(Event::Key(key)) if key.code == KeyCode::Char('q') => ControlFlow::Quit,
                    _ => ControlFlow::Continue,
                })
            })
            .unwrap();
        assert_eq!(event_loop.driver().remaining(), 1);
    }
}
