//! Line-oriented console renderer and command input.
//!
//! Draws a text frame whenever the store signals a visible change, and
//! turns typed lines into intents:
//!
//! ```text
//!  menu | moisture | light | water | dashboard | back
//!  refresh | open | close | tap <raw_x> <raw_y>
//! ```
//!
//! While the UI sleeps the console prints one blank marker and drops
//! input until it wakes again.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::adapters::thread::spawn_named;
use crate::app::commands::{UiIntent, UnknownIntent};
use crate::app::controller::Controller;
use crate::app::ports::Clock;
use crate::app::store::StateStore;
use crate::config::UiConfig;

use super::touch::TouchPanel;
use super::view::{Icon, IconSet, RenderCache, ViewModel};
use super::{RenderSignal, subscribe_renderer};

const POLL_SLICE: Duration = Duration::from_millis(20);

pub struct ConsoleRenderer<W: Write> {
    store: Arc<StateStore>,
    signal: Arc<RenderSignal>,
    ui: UiConfig,
    icons: IconSet,
    cache: RenderCache,
    blanked: bool,
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(store: Arc<StateStore>, ui: UiConfig, icons: IconSet, out: W) -> Self {
        let signal = subscribe_renderer(&store);
        Self {
            store,
            signal,
            ui,
            icons,
            cache: RenderCache::default(),
            blanked: false,
            out,
        }
    }

    /// Draw one frame if anything visible changed. Returns whether
    /// something was written.
    pub fn render_once(&mut self) -> io::Result<bool> {
        let st = self.store.snapshot();
        if !st.ui_awake {
            if self.blanked {
                return Ok(false);
            }
            writeln!(self.out, "──── screen off ────")?;
            self.out.flush()?;
            self.blanked = true;
            self.cache.invalidate();
            return Ok(true);
        }
        self.blanked = false;
        if !self.cache.needs_redraw(&st) {
            return Ok(false);
        }

        let vm = ViewModel::from_state(&st, &self.ui);
        let icon = match self.icons.icon(vm.mood) {
            Icon::Asset(path) => format!("[{}]", path.display()),
            Icon::Glyph(g) => g.to_string(),
        };
        writeln!(self.out, "──── {} ──── {}", vm.title, icon)?;
        for line in &vm.lines {
            writeln!(self.out, "  {line}")?;
        }
        self.out.flush()?;
        Ok(true)
    }

    /// Render on every signal, and at least every `render_interval_ms`.
    pub fn run(mut self) {
        let interval = Duration::from_millis(self.ui.render_interval_ms);
        let mut last = Instant::now();
        loop {
            let signalled = self.signal.try_take().is_some();
            if signalled || last.elapsed() >= interval {
                if let Err(e) = self.render_once() {
                    warn!("Console render failed: {}", e);
                    return;
                }
                last = Instant::now();
            }
            std::thread::sleep(POLL_SLICE);
        }
    }
}

impl<W: Write + Send + 'static> ConsoleRenderer<W> {
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        spawn_named("console-ui", 64, move || self.run())
    }
}

/// What a typed line turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Dispatched(UiIntent),
    /// Recognised but produced no intent (missed tap, blank line).
    Ignored,
    /// The UI is asleep; input is dropped.
    Asleep,
}

/// Parse a console line and apply it through the controller.
pub fn handle_line(
    controller: &Controller,
    panel: &mut TouchPanel,
    clock: &dyn Clock,
    line: &str,
) -> Result<LineOutcome, UnknownIntent> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(LineOutcome::Ignored);
    }
    let st = controller.snapshot();
    if !st.ui_awake {
        debug!("Console: asleep, dropping '{}'", line);
        return Ok(LineOutcome::Asleep);
    }

    let intent = match parse_tap(line) {
        Some(Ok((x, y))) => {
            let now = clock.now_ms();
            let intent = panel.press(x, y, now, st.screen);
            panel.release(now);
            intent
        }
        Some(Err(())) => return Err(UnknownIntent(line.to_string())),
        None => Some(line.parse::<UiIntent>()?),
    };

    match intent {
        Some(intent) => {
            controller.dispatch(intent);
            Ok(LineOutcome::Dispatched(intent))
        }
        None => Ok(LineOutcome::Ignored),
    }
}

/// `tap <x> <y>`; `None` if the line is not a tap.
fn parse_tap(line: &str) -> Option<Result<(u16, u16), ()>> {
    let mut words = line.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("tap") {
        return None;
    }
    let x = words.next().and_then(|w| w.parse().ok());
    let y = words.next().and_then(|w| w.parse().ok());
    Some(x.zip(y).ok_or(()))
}

/// Read commands from `input` until EOF on a dedicated thread.
pub fn spawn_input<R>(
    input: R,
    controller: Arc<Controller>,
    clock: Arc<dyn Clock>,
    ui: &UiConfig,
) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    let mut panel = TouchPanel::from_config(ui);
    spawn_named("console-input", 32, move || {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("Console input closed: {}", e);
                    break;
                }
            };
            if let Err(e) = handle_line(&controller, &mut panel, clock.as_ref(), &line) {
                warn!("Console: {}", e);
            }
        }
        debug!("Console input reached EOF");
    })
}
