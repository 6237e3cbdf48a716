use crate::bus::InputBus;
use crate::command::{Action, Command, CommandInner, MouseMode, TerminalCommand};
use crate::event::InputEvent;
use crate::model::Model;
use crate::subscription::SubscriptionManager;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Errors that can occur while initializing or running a [`Program`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// An I/O error from terminal setup, rendering, or teardown.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration options for a [`Program`].
///
/// Use struct update syntax to override only the options you need:
///
/// ```rust,ignore
/// let opts = ProgramOptions {
///     title: Some("Case files".into()),
///     ..ProgramOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Target frames per second (default: 60, max: 120).
    pub fps: u32,
    /// Start in alternate screen (default: true).
    pub alt_screen: bool,
    /// Pointer capture mode (default: all motion, so hover reaches submenus).
    pub mouse_mode: Option<MouseMode>,
    /// Set terminal title.
    pub title: Option<String>,
    /// Whether to restore the terminal from a panic hook (default: true).
    pub catch_panics: bool,
    /// Whether to exit on Ctrl+C signals (default: true).
    pub handle_signals: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            alt_screen: true,
            mouse_mode: Some(MouseMode::AllMotion),
            title: None,
            catch_panics: true,
            handle_signals: true,
        }
    }
}

/// A cloneable handle to a running [`Program`] for external control.
///
/// Background tasks use it to raise notifications or other messages without
/// going through a widget.
#[derive(Clone)]
pub struct ProgramHandle<Msg: Send + 'static> {
    msg_tx: mpsc::UnboundedSender<Msg>,
    killed: Arc<AtomicBool>,
}

impl<Msg: Send + 'static> ProgramHandle<Msg> {
    /// Send a message to the running program. Ignored once it has exited.
    pub fn send(&self, msg: Msg) {
        let _ = self.msg_tx.send(msg);
    }

    /// Force the program to exit at its next loop iteration.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }
}

/// The program runtime. Owns the terminal, the input bus, the message queue
/// and the subscription set of one [`Model`].
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> Result<(), ProgramError> {
///     let model = Program::<App>::new(())?.run().await?;
///     Ok(())
/// }
/// ```
pub struct Program<M: Model> {
    model: M,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    msg_tx: mpsc::UnboundedSender<M::Message>,
    msg_rx: mpsc::UnboundedReceiver<M::Message>,
    bus: InputBus,
    subscription_manager: SubscriptionManager<M::Message>,
    options: ProgramOptions,
    needs_redraw: bool,
    should_quit: bool,
    killed: Arc<AtomicBool>,
}

impl<M: Model> Program<M> {
    /// Create a new program with default options.
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Create a new program with custom options.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let bus = InputBus::new();

        let (model, init_cmd) = M::init(flags);

        let terminal = init_terminal(&options)?;
        let subscription_manager = SubscriptionManager::new(msg_tx.clone(), bus.clone());

        let mut program = Self {
            model,
            terminal,
            msg_tx,
            msg_rx,
            bus,
            subscription_manager,
            options,
            needs_redraw: true,
            should_quit: false,
            killed: Arc::new(AtomicBool::new(false)),
        };

        tracing::debug!("program initialized");
        program.execute_command(init_cmd);
        let subs = program.model.subscriptions();
        program.subscription_manager.reconcile(subs);

        Ok(program)
    }

    /// Get a handle for external control (send messages, force-kill).
    pub fn handle(&self) -> ProgramHandle<M::Message> {
        ProgramHandle {
            msg_tx: self.msg_tx.clone(),
            killed: self.killed.clone(),
        }
    }

    /// The input bus this program publishes terminal events on.
    pub fn bus(&self) -> InputBus {
        self.bus.clone()
    }

    /// Run the program until the model quits. Returns the final model.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let reader = spawn_reader(self.bus.clone());
        let result = self.event_loop().await;

        tracing::debug!("shutting down");
        reader.abort();
        self.subscription_manager.shutdown();
        restore_terminal(self.options.alt_screen)?;

        result.map(|()| self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        self.render()?;

        let fps = self.options.fps.clamp(1, 120);
        let mut frame_interval =
            tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handle_signals = self.options.handle_signals;

        loop {
            if self.killed.load(Ordering::SeqCst) {
                return Ok(());
            }

            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c(), if handle_signals => {
                    tracing::debug!("received ctrl+c signal");
                    return Ok(());
                }

                Some(msg) = self.msg_rx.recv() => {
                    self.process_message(msg);
                    if self.should_quit {
                        return Ok(());
                    }
                }

                _ = frame_interval.tick() => {
                    if self.needs_redraw {
                        self.render()?;
                        self.needs_redraw = false;
                    }
                }
            }
        }
    }

    fn process_message(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_command(cmd);

        // Listener (de)registration for this message completes before the
        // next message is taken off the queue.
        let subs = self.model.subscriptions();
        self.subscription_manager.reconcile(subs);

        self.needs_redraw = true;
    }

    fn execute_command(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => {
                let _ = self.msg_tx.send(msg);
            }
            CommandInner::Action(Action::Quit) => {
                self.should_quit = true;
            }
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.execute_command(cmd);
                }
            }
            CommandInner::Terminal(tcmd) => execute_terminal_command(tcmd),
        }
    }

    fn render(&mut self) -> Result<(), ProgramError> {
        self.terminal.draw(|frame| {
            self.model.view(frame);
        })?;
        Ok(())
    }
}

/// Read the terminal once and publish every event on the bus.
fn spawn_reader(bus: InputBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(result) = events.next().await {
            match result {
                Ok(event) => {
                    bus.publish(InputEvent::from(event));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "terminal input read failed");
                }
            }
        }
    })
}

/// Pointer capture honoring [`MouseMode`]. All-motion is crossterm's full
/// capture (including `?1003`); cell motion leaves out plain-motion reports.
struct EnableMouse(MouseMode);

impl crossterm::Command for EnableMouse {
    fn write_ansi(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        match self.0 {
            MouseMode::AllMotion => crossterm::Command::write_ansi(&EnableMouseCapture, f),
            MouseMode::CellMotion => f.write_str(concat!(
                "\x1B[?1000h", // press and release
                "\x1B[?1002h", // drag with a button held
                "\x1B[?1015h",
                "\x1B[?1006h", // SGR coordinates
            )),
        }
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        // The console reports every mouse event; there is no motion filter.
        crossterm::Command::execute_winapi(&EnableMouseCapture)
    }
}

fn execute_terminal_command(cmd: TerminalCommand) {
    let mut writer = stdout();
    match cmd {
        TerminalCommand::EnableMouseCapture(mode) => {
            execute!(writer, EnableMouse(mode)).ok();
        }
        TerminalCommand::DisableMouse => {
            execute!(writer, DisableMouseCapture).ok();
        }
        TerminalCommand::SetTitle(title) => {
            execute!(writer, SetTitle(title)).ok();
        }
    }
}

fn init_terminal(
    options: &ProgramOptions,
) -> Result<Terminal<CrosstermBackend<Stdout>>, ProgramError> {
    if options.catch_panics {
        use std::sync::Once;
        static HOOK_INSTALLED: Once = Once::new();
        let alt_screen = options.alt_screen;
        HOOK_INSTALLED.call_once(|| {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = restore_terminal(alt_screen);
                original_hook(info);
            }));
        });
    }

    enable_raw_mode()?;
    let mut writer = stdout();

    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    if let Some(mode) = options.mouse_mode {
        execute!(writer, EnableMouse(mode))?;
    }
    if let Some(ref title) = options.title {
        execute!(writer, SetTitle(title))?;
    }
    execute!(writer, cursor::Hide)?;

    let terminal = Terminal::new(CrosstermBackend::new(writer))?;
    Ok(terminal)
}

fn restore_terminal(alt_screen: bool) -> Result<(), std::io::Error> {
    // Best effort: keep restoring even if an individual step fails.
    let raw = disable_raw_mode();
    let mut writer = stdout();
    execute!(writer, DisableMouseCapture).ok();
    execute!(writer, cursor::Show).ok();
    if alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_capture_hover() {
        let options = ProgramOptions::default();
        assert_eq!(options.mouse_mode, Some(MouseMode::AllMotion));
        assert_eq!(options.fps, 60);
        assert!(options.alt_screen);
    }

    fn ansi(mode: MouseMode) -> String {
        let mut out = String::new();
        crossterm::Command::write_ansi(&EnableMouse(mode), &mut out).unwrap();
        out
    }

    #[test]
    fn cell_motion_leaves_out_hover_reports() {
        let cell = ansi(MouseMode::CellMotion);
        assert!(cell.contains("\x1B[?1002h"));
        assert!(cell.contains("\x1B[?1006h"));
        assert!(!cell.contains("?1003h"));
    }

    #[test]
    fn all_motion_enables_hover_reports() {
        let all = ansi(MouseMode::AllMotion);
        assert!(all.contains("\x1B[?1003h"));
        assert!(all.contains("\x1B[?1002h"));
    }
}
