//! Testing utilities: a capturing render backend and a synchronous
//! fixture that drives the dispatcher without a terminal.

use std::sync::mpsc;

use crate::{
    backend::RenderBackend,
    core::{
        component::{Component, ComponentState},
        error::Result,
        event::{Event, key, mouse},
        id::ComponentId,
        screen::CursorShape,
        style::Style,
        trellis::{Config, Trellis},
    },
    geom::{Expanse, Point},
};

/// A render backend that records paint operations.
#[derive(Default)]
pub struct TestRender {
    /// Recorded text writes.
    pub texts: Vec<(Point, String)>,
    /// Last cursor placement.
    pub cursor: Option<(Point, CursorShape)>,
    /// Number of flushes.
    pub flushes: usize,
}

impl RenderBackend for TestRender {
    fn style(&mut self, _s: &Style) -> Result<()> {
        Ok(())
    }

    fn text(&mut self, loc: Point, txt: &str) -> Result<()> {
        self.texts.push((loc, txt.to_string()));
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Option<(Point, CursorShape)>) -> Result<()> {
        self.cursor = cursor;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// A synchronous harness around a [`Trellis`]. Tests inject events
/// directly into the dispatcher, then drain anything components posted,
/// so every effect is observable immediately after the call returns.
pub struct Fixture {
    /// The dispatcher under test.
    pub trellis: Trellis,
    /// The capturing backend.
    pub backend: TestRender,
    /// The queue's receiving end, drained synchronously.
    rx: mpsc::Receiver<Event>,
}

impl Fixture {
    /// Construct a fixture with the standard configuration and an
    /// initial terminal size.
    pub fn new(size: Expanse) -> Self {
        Self::with_config(Config::new(), size)
    }

    /// Construct a fixture with a custom configuration.
    pub fn with_config(config: Config, size: Expanse) -> Self {
        let mut trellis = Trellis::new(config);
        let rx = trellis.take_rx().expect("fresh trellis has a queue");
        let mut fx = Self {
            trellis,
            backend: TestRender::default(),
            rx,
        };
        fx.process(Event::Resize(size));
        fx
    }

    /// The root component id.
    pub fn root(&self) -> ComponentId {
        self.trellis.root()
    }

    /// Attach a component under a parent and run its init callback.
    pub fn add(&mut self, parent: ComponentId, comp: impl Component) -> ComponentId {
        let id = self.trellis.add_child(parent, comp);
        self.process(Event::Resize(self.trellis.screen.size));
        id
    }

    /// Process one event, then drain everything components posted.
    pub fn process(&mut self, ev: Event) {
        self.trellis.process(ev).expect("event processing failed");
        self.drain();
    }

    /// Drain posted events in post order.
    pub fn drain(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            self.trellis.process(ev).expect("event processing failed");
        }
    }

    /// Send a keystroke.
    pub fn key(&mut self, k: impl Into<key::Key>) {
        self.process(Event::Key(k.into()));
    }

    /// Send a sequence of runes.
    pub fn runes(&mut self, s: &str) {
        for c in s.chars() {
            self.key(c);
        }
    }

    /// Click the primary button at a screen position.
    pub fn click(&mut self, x: u32, y: u32) {
        self.process(Event::Mouse(mouse::MouseEvent {
            action: mouse::Action::Down,
            button: mouse::Button::Left,
            modifiers: key::Empty,
            location: Point::new(x, y),
        }));
    }

    /// Render into the capturing backend.
    pub fn render(&mut self) {
        self.trellis
            .render(&mut self.backend)
            .expect("render failed");
    }

    /// Render and return the screen rows as text.
    pub fn screen(&mut self) -> Vec<String> {
        self.render();
        self.trellis
            .buf()
            .map(|b| b.rows())
            .unwrap_or_default()
    }

    /// Inspect a component's state out-of-band.
    pub fn inspect<R>(&mut self, id: ComponentId, f: impl FnOnce(&ComponentState) -> R) -> R {
        self.trellis
            .inspect(id, f)
            .expect("component not in the tree")
    }
}
