use super::App;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::panic;
use tracing::{debug, warn};

pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backend = CrosstermBackend::new(std::io::stdout());
        if let Ok(mut terminal) = Terminal::new(backend) {
            let _ = terminal.show_cursor();
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture, crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal.clear()?;
    terminal.hide_cursor()?;
    app.draw(&mut terminal)?;

    let mut events = EventStream::new();
    while !app.should_exit {
        let deadline = app.navigator.next_deadline().map(|due| tokio::time::Instant::from_std(app.started + due));
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => app.handle_event(&event),
                Some(Err(e)) => warn!(error = %e, "terminal event error"),
                None => {
                    debug!("terminal event stream closed");
                    app.should_exit = true;
                }
            },
            _ = timer => {
                let now = app.elapsed();
                app.tick(now);
            }
        }
        app.draw(&mut terminal)?;
    }

    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), DisableMouseCapture, crossterm::terminal::LeaveAlternateScreen)?;

    Ok(())
}
