//! TUI runtime: terminal ownership and the event loop.
//!
//! The loop collects events (terminal input, inbox results, ticks), feeds
//! them through the `Controller`, and renders on every tick.

mod controller;
mod handlers;
pub mod inbox;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
pub use controller::{Controller, RuntimeOptions};
use crossterm::event;
use parle_core::gateway::Backend;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::events::UiEvent;
use crate::{render, terminal};

/// Target frame duration while something is in flight (~60fps).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval when idle.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    pub controller: Controller,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(backend: Backend, options: RuntimeOptions) -> Result<Self> {
        let controller = Controller::new(backend, options)?;
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal()?;
        Ok(Self {
            controller,
            terminal,
            last_tick: Instant::now(),
            last_terminal_event: Instant::now(),
        })
    }

    /// Runs until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        self.draw()?;
        while !self.controller.should_quit() {
            let events = self.collect_events()?;
            let mut needs_render = false;
            for event in events {
                needs_render = true;
                self.controller.dispatch(event);
                if self.controller.should_quit() {
                    return Ok(());
                }
            }
            if needs_render {
                self.draw()?;
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let state = &self.controller.state;
        self.terminal.draw(|frame| render::render(state, frame))?;
        Ok(())
    }

    /// Collects events from the terminal and the inbox.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Spinners only move while a request is in flight.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll =
            self.controller.state.tui.tasks.is_any_running() || recent_terminal_activity;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.controller.drain_inbox_into(&mut events);

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
            self.last_terminal_event = Instant::now();
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
