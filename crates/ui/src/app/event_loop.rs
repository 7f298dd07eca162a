use super::App;
use crate::event_handler::TerminalEvents;

use crossterm::cursor::Show;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::Stream;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::{io, panic};
use tokio::time::MissedTickBehavior;

/// Tick for timed state such as the copy indicator
const TICK: Duration = Duration::from_millis(100);

type PanicHook = Arc<dyn Fn(&panic::PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Run the app on the real terminal until it exits
///
/// The terminal is restored and the previous panic hook reinstalled on every
/// exit path, including errors from the loop.
pub async fn run(app: &mut App) -> Result<()> {
    terminal::enable_raw_mode()?;
    let keyboard_enhanced = match enter() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            let _ = restore(false);
            return Err(e);
        }
    };
    tracing::debug!(keyboard_enhanced, "terminal ready");

    let original_hook: PanicHook = Arc::from(panic::take_hook());
    let chained = Arc::clone(&original_hook);
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore(keyboard_enhanced);
        chained(panic_info);
    }));

    let result = async {
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        drive(app, TerminalEvents::new(), |app| app.draw(&mut terminal)).await
    }
    .await;

    let _ = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| original_hook(panic_info)));

    let restored = restore(keyboard_enhanced);
    match (&result, &restored) {
        (Err(e), Err(restore_err)) => tracing::warn!(error = %e, restore_error = %restore_err, "loop and restore failed"),
        (Err(e), Ok(())) => tracing::warn!(error = %e, "event loop failed"),
        _ => tracing::info!("terminal restored"),
    }

    result.and(restored)
}

/// Alternate screen, bracketed paste, and keyboard enhancement when available
fn enter() -> Result<bool> {
    crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;

    // Shift+Enter is only distinguishable from Enter with disambiguated escape codes
    Ok(terminal::supports_keyboard_enhancement().unwrap_or(false)
        && crossterm::execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .is_ok())
}

/// Undo [`enter`] and raw mode; every step is attempted
fn restore(keyboard_enhanced: bool) -> Result<()> {
    let popped = if keyboard_enhanced {
        crossterm::execute!(io::stdout(), PopKeyboardEnhancementFlags)
    } else {
        Ok(())
    };
    let left = crossterm::execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen, Show);
    let raw = terminal::disable_raw_mode();
    popped.and(left).and(raw)
}

/// Event loop proper, independent of the output terminal
///
/// Terminal input, the tick, and the app's channels are awaited together, so
/// a busy store never holds back keystrokes. Returns the first input or draw
/// error.
pub(crate) async fn drive<S>(
    app: &mut App, mut events: TerminalEvents<S>, mut draw: impl FnMut(&mut App) -> Result<()>,
) -> Result<()>
where
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    draw(app)?;

    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut copy_rx = app.copy_rx.take();
    let mut revision_rx = app.revision_rx.take();
    let mut ready_rx = app.ready_rx.take();

    while !app.should_exit {
        let mut dirty = false;
        tokio::select! {
            event = events.next() => match event? {
                Some(event) => dirty |= app.handle_event(event),
                None => {
                    tracing::info!("terminal input closed");
                    app.should_exit = true;
                }
            },
            _ = tick.tick() => {}
            maybe_copy = async {
                match copy_rx.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match maybe_copy {
                    Some(result) => dirty |= app.finish_copy(result, Instant::now()),
                    None => copy_rx = None,
                }
            }
            changed = async {
                match revision_rx.as_mut() {
                    Some(rx) => rx.changed().await.is_ok(),
                    None => std::future::pending().await,
                }
            } => {
                if changed {
                    dirty = true;
                } else {
                    tracing::debug!("transcript store dropped");
                    revision_rx = None;
                }
            }
            changed = async {
                match ready_rx.as_mut() {
                    Some(rx) => rx.changed().await.is_ok(),
                    None => std::future::pending().await,
                }
            } => {
                let can_send = ready_rx.as_ref().filter(|_| changed).map(|rx| *rx.borrow());
                match can_send {
                    Some(can_send) => {
                        app.view_mut().set_can_send(can_send);
                        dirty = true;
                    }
                    None => ready_rx = None,
                }
            }
        }

        dirty |= app.tick(Instant::now());
        if dirty {
            draw(app)?;
        }
    }

    Ok(())
}
