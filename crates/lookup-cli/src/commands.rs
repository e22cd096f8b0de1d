//! Subcommand runners
//!
//! Each runner writes user-facing output to the given writer; logs go to
//! stderr through `tracing`.

use lookup_core::{ControllerSnapshot, LookupHandle, LookupState, StatusKind, StatusView, ViewText};
use lookup_http::{HealthProbe, HttpLookupError};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Prints a snapshot whenever its lookup state differs from the last one
struct Renderer<'a, W> {
    out: &'a mut W,
    text: &'a ViewText,
    last: Option<LookupState>,
}

impl<'a, W: Write> Renderer<'a, W> {
    fn new(out: &'a mut W, text: &'a ViewText) -> Self {
        Self {
            out,
            text,
            last: None,
        }
    }

    fn show(&mut self, snapshot: &ControllerSnapshot) -> std::io::Result<()> {
        self.show_state(&snapshot.state)
    }

    fn show_state(&mut self, state: &LookupState) -> std::io::Result<()> {
        if self.last.as_ref() == Some(state) {
            return Ok(());
        }
        writeln!(self.out, "{}", StatusView::render(state, self.text))?;
        self.last = Some(state.clone());
        Ok(())
    }
}

/// Submit one identifier and print each state until it settles
///
/// A non-blank submit always passes through `Fetching`, so that state is
/// printed up front; the watch channel only keeps the latest snapshot and a
/// fast backend can settle before it is observed.
///
/// # Errors
/// Fails on output errors or if the controller shuts down.
pub async fn run_fetch<W: Write>(
    handle: &LookupHandle,
    identifier: &str,
    out: &mut W,
    text: &ViewText,
) -> anyhow::Result<StatusKind> {
    let mut rx = handle.subscribe();
    let expected = handle.snapshot().requests_issued + 1;
    let mut renderer = Renderer::new(out, text);

    handle.submit_identifier(identifier);

    if identifier.trim().is_empty() {
        let snapshot = handle.wait_for_status(StatusKind::Idle).await?;
        renderer.show(&snapshot)?;
        return Ok(snapshot.status());
    }

    renderer.show_state(&LookupState::Fetching {
        identifier: identifier.trim().to_string(),
    })?;

    loop {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.requests_issued >= expected {
            renderer.show(&snapshot)?;
            if snapshot.state.is_settled() {
                return Ok(snapshot.status());
            }
        }
        rx.changed().await?;
    }
}

/// Read identifiers line by line and submit each one
///
/// The current state is rendered on every change. Returns the final
/// snapshot once input ends and the last submission has settled.
///
/// # Errors
/// Fails on I/O errors or if the controller shuts down.
pub async fn run_interactive<R, W>(
    handle: &LookupHandle,
    input: R,
    out: &mut W,
    text: &ViewText,
) -> anyhow::Result<ControllerSnapshot>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut rx = handle.subscribe();
    let mut expected = handle.snapshot().requests_issued;

    writeln!(out, "{} ({})", text.submit_label, text.placeholder)?;
    let mut renderer = Renderer::new(out, text);
    renderer.show(&rx.borrow_and_update())?;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !line.trim().is_empty() {
                        expected += 1;
                    }
                    handle.submit_identifier(line);
                }
                None => break,
            },
            changed = rx.changed() => {
                changed?;
                let snapshot = rx.borrow_and_update().clone();
                renderer.show(&snapshot)?;
            }
        }
    }

    loop {
        let snapshot = rx.borrow_and_update().clone();
        renderer.show(&snapshot)?;
        if snapshot.requests_issued >= expected && snapshot.state.is_settled() {
            return Ok(snapshot);
        }
        rx.changed().await?;
    }
}

/// Probe backend health and print the report
///
/// Returns whether the backend is healthy.
///
/// # Errors
/// Fails on output errors. An unreachable backend is reported, not raised.
pub async fn run_health<W: Write>(probe: &HealthProbe, out: &mut W) -> anyhow::Result<bool> {
    match probe.check().await {
        Ok(report) => {
            writeln!(out, "Backend Health: {report}")?;
            if let Some(body) = &report.body {
                writeln!(out, "{}", serde_json::to_string_pretty(body)?)?;
            }
            Ok(report.healthy)
        }
        Err(e @ (HttpLookupError::Transport(_) | HttpLookupError::Timeout)) => {
            writeln!(out, "Backend Health: unreachable ({e})")?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
