//! Maps terminal events onto shell operations and runs the draw loop.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::api::ApiClient;
use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::shell::{Focus, Shell};
use crate::ui::{self, Panel};

/// Rows moved per wheel notch or arrow key.
const SCROLL_STEP: i32 = 1;
const WHEEL_STEP: i32 = 3;

/// Applies one input event. Returns whether it was consumed.
pub fn handle_event<C: ApiClient>(shell: &mut Shell<C>, event: &Event) -> bool {
    match event {
        Event::Key(key) => handle_key(shell, key),
        Event::Mouse(mouse) => handle_mouse(shell, mouse),
        Event::Paste(text) => {
            if shell.focus() == Focus::None {
                shell.set_search(text)
            } else {
                shell.type_str(text)
            }
        }
        _ => false,
    }
}

fn handle_key<C: ApiClient>(shell: &mut Shell<C>, key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
        shell.request_quit();
        return true;
    }

    let typing = shell.focus() != Focus::None;
    match key.code {
        KeyCode::Esc => shell.escape(),
        KeyCode::Char(ch) if typing && !ctrl => shell.type_char(ch),
        KeyCode::Backspace if typing => shell.backspace(),
        KeyCode::Enter if typing => shell.enter(),
        KeyCode::Char('q') if !ctrl => {
            shell.request_quit();
            true
        }
        KeyCode::Char('/') => {
            shell.focus_search();
            true
        }
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            shell.navigate_index(index)
        }
        KeyCode::Up => scroll(shell, -SCROLL_STEP),
        KeyCode::Down => scroll(shell, SCROLL_STEP),
        KeyCode::PageUp => scroll(shell, -page_step(shell)),
        KeyCode::PageDown => scroll(shell, page_step(shell)),
        KeyCode::Home => scroll(shell, -i32::from(u16::MAX)),
        _ => false,
    }
}

fn handle_mouse<C: ApiClient>(shell: &mut Shell<C>, mouse: &MouseEvent) -> bool {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => shell.pointer_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => shell.pointer_drag(mouse.row),
        MouseEventKind::Up(MouseButton::Left) => shell.pointer_up().is_some(),
        MouseEventKind::ScrollUp => scroll(shell, -WHEEL_STEP),
        MouseEventKind::ScrollDown => scroll(shell, WHEEL_STEP),
        _ => false,
    }
}

fn scroll<C: ApiClient>(shell: &mut Shell<C>, delta: i32) -> bool {
    shell.scroll_by(delta);
    true
}

fn page_step<C: ApiClient>(shell: &Shell<C>) -> i32 {
    i32::from(shell.overlays().viewport().height.saturating_sub(1).max(1))
}

/// Runs a dashboard session until a quit is requested.
///
/// Each idle tick delivers finished requests, advances overlay animations
/// and redraws. The terminal is restored even when the loop fails.
pub fn run_dashboard<D, O, C>(
    input: D,
    output: &mut O,
    shell: &mut Shell<C>,
    poll_interval: Duration,
) -> io::Result<()>
where
    D: InputDriver,
    O: OutputDriver,
    C: ApiClient,
{
    output.enter()?;
    let mut panel = Panel::new();
    let mut event_loop = EventLoop::new(input, poll_interval);

    let result = event_loop.run(|_, event| {
        if let Some(event) = event {
            handle_event(shell, &event);
            return Ok(ControlFlow::Continue);
        }
        shell.tick(Instant::now());
        output.draw(|mut frame| ui::draw(&mut frame, shell, &mut panel))?;
        if shell.quit_requested() {
            tracing::info!("quit requested");
            Ok(ControlFlow::Quit)
        } else {
            Ok(ControlFlow::Continue)
        }
    });

    let restored = output.exit();
    result.and(restored)
}
