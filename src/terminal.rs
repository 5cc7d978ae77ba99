// Copyright (c) 2026 softveil

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![
                Cell {
                    ch: ' ',
                    fg: None,
                    bg: None,
                };
                len
            ],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Emits only the cells that changed since the previous frame, batching
    /// horizontal runs that share one attribute pair into a single print.
    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let needs_full = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);

        if needs_full {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = Some(LastFrame::new(frame.width, frame.height));
        }
        let Some(last) = self.last.as_mut() else {
            return Ok(());
        };

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_pos: Option<(u16, u16)> = None;
        let width = frame.width as usize;

        for y in 0..frame.height {
            let row = y as usize * width;
            let mut x = 0usize;
            while x < width {
                let idx = row + x;
                let cell = frame.cells[idx];
                if !needs_full && last.cells[idx] == cell {
                    x += 1;
                    continue;
                }

                let (fg, bg) = (cell.fg, cell.bg);
                let start_x = x as u16;
                let mut run_len: u16 = 1;
                self.run_buf.clear();
                self.run_buf.push(cell.ch);
                last.cells[idx] = cell;
                x += 1;

                while x < width {
                    let j = row + x;
                    let next = frame.cells[j];
                    if !needs_full && last.cells[j] == next {
                        break;
                    }
                    if next.fg != fg || next.bg != bg {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    last.cells[j] = next;
                    run_len = run_len.saturating_add(1);
                    x += 1;
                }

                if cur_pos != Some((start_x, y)) {
                    self.stdout.queue(cursor::MoveTo(start_x, y))?;
                }
                if fg != cur_fg {
                    self.stdout
                        .queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
                    cur_fg = fg;
                }
                if bg != cur_bg {
                    self.stdout
                        .queue(SetBackgroundColor(bg.unwrap_or(Color::Reset)))?;
                    cur_bg = bg;
                }
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = start_x.saturating_add(run_len);
                cur_pos = if next_x < frame.width {
                    Some((next_x, y))
                } else {
                    None
                };
            }
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

/// Restores the terminal from anywhere (panic hook, signal handlers),
/// ignoring failures: some of these commands are no-ops if setup never ran.
pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
