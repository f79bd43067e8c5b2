//! Crossterm-backed terminal control, event translation, and run loop.

use std::{
    io::{self, Stderr, Write},
    panic,
    sync::mpsc,
    thread,
};

use color_backtrace::{BacktracePrinter, default_output_stream};
use crossterm::{
    ExecutableCommand, QueueableCommand, cursor as ccursor, event as cevent, style as cstyle,
    terminal,
};
use scopeguard::guard;
use tracing::error;

use crate::{
    backend::{BackendControl, RenderBackend},
    core::{
        error::{self, Result},
        event::{Event, key, mouse},
        screen::CursorShape,
        style::{Color, Style},
        trellis::Trellis,
    },
    geom::{Expanse, Point},
};

/// Map IO results into trellis errors.
fn translate_result<T>(e: io::Result<T>) -> Result<T> {
    e.map_err(|e| error::Error::Render(e.to_string()))
}

/// Translate a trellis color into a crossterm color.
fn translate_color(c: Color) -> cstyle::Color {
    match c {
        Color::Default => cstyle::Color::Reset,
        Color::Black => cstyle::Color::Black,
        Color::Red => cstyle::Color::Red,
        Color::Green => cstyle::Color::Green,
        Color::Yellow => cstyle::Color::Yellow,
        Color::Blue => cstyle::Color::Blue,
        Color::Magenta => cstyle::Color::Magenta,
        Color::Cyan => cstyle::Color::Cyan,
        Color::White => cstyle::Color::White,
        Color::Grey => cstyle::Color::Grey,
        Color::DarkGrey => cstyle::Color::DarkGrey,
        Color::Rgb { r, g, b } => cstyle::Color::Rgb { r, g, b },
        Color::AnsiValue(a) => cstyle::Color::AnsiValue(a),
    }
}

/// Crossterm-backed implementation of [`BackendControl`].
pub struct CrosstermControl {
    /// Control output handle.
    fp: Stderr,
}

impl Default for CrosstermControl {
    fn default() -> Self {
        Self { fp: io::stderr() }
    }
}

impl CrosstermControl {
    /// Enter raw mode and the alternate screen.
    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.fp.execute(terminal::EnterAlternateScreen)?;
        self.fp.execute(cevent::EnableMouseCapture)?;
        self.fp.execute(ccursor::Hide)?;
        Ok(())
    }

    /// Leave the alternate screen and restore the terminal.
    fn exit(&mut self) -> io::Result<()> {
        self.fp.execute(terminal::LeaveAlternateScreen)?;
        self.fp.execute(cevent::DisableMouseCapture)?;
        self.fp.execute(ccursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl BackendControl for CrosstermControl {
    fn start(&mut self) -> Result<()> {
        translate_result(self.enter())
    }

    fn stop(&mut self) -> Result<()> {
        translate_result(self.exit())
    }
}

/// Crossterm-backed implementation of [`RenderBackend`].
pub struct CrosstermRender {
    /// Render output handle.
    fp: Stderr,
}

impl Default for CrosstermRender {
    fn default() -> Self {
        Self { fp: io::stderr() }
    }
}

impl RenderBackend for CrosstermRender {
    fn style(&mut self, s: &Style) -> Result<()> {
        let r = (|| {
            self.fp
                .queue(cstyle::SetAttribute(cstyle::Attribute::Reset))?;
            self.fp
                .queue(cstyle::SetForegroundColor(translate_color(s.fg)))?;
            self.fp
                .queue(cstyle::SetBackgroundColor(translate_color(s.bg)))?;
            if s.attrs.bold {
                self.fp.queue(cstyle::SetAttribute(cstyle::Attribute::Bold))?;
            }
            if s.attrs.dim {
                self.fp.queue(cstyle::SetAttribute(cstyle::Attribute::Dim))?;
            }
            if s.attrs.italic {
                self.fp
                    .queue(cstyle::SetAttribute(cstyle::Attribute::Italic))?;
            }
            if s.attrs.underline {
                self.fp
                    .queue(cstyle::SetAttribute(cstyle::Attribute::Underlined))?;
            }
            if s.attrs.reverse {
                self.fp
                    .queue(cstyle::SetAttribute(cstyle::Attribute::Reverse))?;
            }
            Ok(())
        })();
        translate_result(r)
    }

    fn text(&mut self, loc: Point, txt: &str) -> Result<()> {
        let r = (|| {
            self.fp.queue(ccursor::MoveTo(loc.x as u16, loc.y as u16))?;
            self.fp.queue(cstyle::Print(txt))?;
            Ok(())
        })();
        translate_result(r)
    }

    fn set_cursor(&mut self, cursor: Option<(Point, CursorShape)>) -> Result<()> {
        let r = (|| match cursor {
            Some((p, shape)) => {
                self.fp.queue(ccursor::MoveTo(p.x as u16, p.y as u16))?;
                self.fp.queue(match shape {
                    CursorShape::Block => ccursor::SetCursorStyle::SteadyBlock,
                    CursorShape::Line => ccursor::SetCursorStyle::SteadyBar,
                    CursorShape::Underscore => ccursor::SetCursorStyle::SteadyUnderScore,
                })?;
                self.fp.queue(ccursor::Show)?;
                Ok(())
            }
            None => {
                self.fp.queue(ccursor::Hide)?;
                Ok(())
            }
        })();
        translate_result(r)
    }

    fn flush(&mut self) -> Result<()> {
        translate_result(self.fp.flush())
    }
}

/// Translate crossterm key modifiers.
fn translate_mods(mods: cevent::KeyModifiers) -> key::Mods {
    key::Mods {
        shift: mods.contains(cevent::KeyModifiers::SHIFT),
        ctrl: mods.contains(cevent::KeyModifiers::CONTROL),
        alt: mods.contains(cevent::KeyModifiers::ALT),
    }
}

/// Translate a crossterm mouse button.
fn translate_button(b: cevent::MouseButton) -> mouse::Button {
    match b {
        cevent::MouseButton::Left => mouse::Button::Left,
        cevent::MouseButton::Right => mouse::Button::Right,
        cevent::MouseButton::Middle => mouse::Button::Middle,
    }
}

/// Stateful translation of crossterm events. Tracks in-flight drags so a
/// button release that ends a drag arrives as a drop.
#[derive(Default)]
struct Translator {
    /// A drag is in flight.
    dragging: bool,
}

impl Translator {
    /// Translate one crossterm event; `None` for events this core does
    /// not dispatch.
    fn translate(&mut self, e: cevent::Event) -> Option<Event> {
        match e {
            cevent::Event::Key(k) => {
                if k.kind == cevent::KeyEventKind::Release {
                    return None;
                }
                let code = match k.code {
                    cevent::KeyCode::Backspace => key::KeyCode::Backspace,
                    cevent::KeyCode::Enter => key::KeyCode::Enter,
                    cevent::KeyCode::Left => key::KeyCode::Left,
                    cevent::KeyCode::Right => key::KeyCode::Right,
                    cevent::KeyCode::Up => key::KeyCode::Up,
                    cevent::KeyCode::Down => key::KeyCode::Down,
                    cevent::KeyCode::Home => key::KeyCode::Home,
                    cevent::KeyCode::End => key::KeyCode::End,
                    cevent::KeyCode::PageUp => key::KeyCode::PageUp,
                    cevent::KeyCode::PageDown => key::KeyCode::PageDown,
                    cevent::KeyCode::Tab => key::KeyCode::Tab,
                    cevent::KeyCode::BackTab => key::KeyCode::BackTab,
                    cevent::KeyCode::Delete => key::KeyCode::Delete,
                    cevent::KeyCode::Insert => key::KeyCode::Insert,
                    cevent::KeyCode::F(n) => key::KeyCode::F(n),
                    cevent::KeyCode::Char(c) => key::KeyCode::Char(c),
                    cevent::KeyCode::Esc => key::KeyCode::Esc,
                    _ => return None,
                };
                Some(Event::Key(key::Key {
                    mods: translate_mods(k.modifiers),
                    code,
                }))
            }
            cevent::Event::Mouse(m) => {
                let mut button = mouse::Button::None;
                let action = match m.kind {
                    cevent::MouseEventKind::Down(b) => {
                        button = translate_button(b);
                        mouse::Action::Down
                    }
                    cevent::MouseEventKind::Up(b) => {
                        button = translate_button(b);
                        if self.dragging {
                            self.dragging = false;
                            mouse::Action::Drop
                        } else {
                            mouse::Action::Up
                        }
                    }
                    cevent::MouseEventKind::Drag(b) => {
                        button = translate_button(b);
                        self.dragging = true;
                        mouse::Action::Drag
                    }
                    cevent::MouseEventKind::Moved => mouse::Action::Move,
                    cevent::MouseEventKind::ScrollUp => {
                        button = mouse::Button::WheelUp;
                        mouse::Action::Down
                    }
                    cevent::MouseEventKind::ScrollDown => {
                        button = mouse::Button::WheelDown;
                        mouse::Action::Down
                    }
                    _ => return None,
                };
                Some(Event::Mouse(mouse::MouseEvent {
                    action,
                    button,
                    modifiers: translate_mods(m.modifiers),
                    location: Point::new(m.column.into(), m.row.into()),
                }))
            }
            cevent::Event::Resize(w, h) => Some(Event::Resize(Expanse::new(w.into(), h.into()))),
            _ => None,
        }
    }
}

/// Spawn the input thread forwarding crossterm events into the queue.
/// The input thread blocks rather than drops when the queue is full.
fn event_emitter(tx: mpsc::SyncSender<Event>) {
    thread::spawn(move || {
        let mut translator = Translator::default();
        loop {
            match cevent::read() {
                Ok(evt) => {
                    if let Some(ev) = translator.translate(evt)
                        && tx.send(ev).is_err()
                    {
                        return;
                    }
                }
                Err(e) => {
                    error!(target: "trellis::backend", "event read error: {e}");
                    return;
                }
            }
        }
    });
}

/// Run the blocking event loop on the crossterm backend until a quit
/// event is processed. Restores the terminal on panic before printing a
/// backtrace.
pub fn runloop(mut trellis: Trellis) -> Result<()> {
    let mut control = CrosstermControl::default();
    let mut render = CrosstermRender::default();
    control.start()?;
    let mut control = guard(control, |mut c| {
        let _ = c.stop();
    });

    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(|pi| {
        let mut stderr = io::stderr();
        let _ = crossterm::execute!(
            stderr,
            terminal::LeaveAlternateScreen,
            cevent::DisableMouseCapture,
            ccursor::Show
        );
        let _ = terminal::disable_raw_mode();
        let _ = BacktracePrinter::new().print_panic_info(pi, &mut default_output_stream());
    }));
    let _hook = guard(previous_hook, |hook| {
        panic::set_hook(hook);
    });

    let rx = trellis
        .take_rx()
        .ok_or_else(|| error::Error::RunLoop("event loop already running".into()))?;
    event_emitter(trellis.events_tx());

    let (w, h) = translate_result(terminal::size())?;
    trellis.process(Event::Resize(Expanse::new(w.into(), h.into())))?;
    trellis.render(&mut render)?;

    loop {
        let event = rx.recv()?;
        trellis.process(event)?;
        if trellis.quitting() {
            break;
        }
        trellis.render_if_pending(&mut render)?;
    }
    let mut control = scopeguard::ScopeGuard::into_inner(control);
    control.stop()
}
