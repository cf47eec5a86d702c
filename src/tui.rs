use crate::fetcher::PageStatus;
use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

/// Terminal progress for a fetch run: a bar over the page range plus one
/// colored line per page. Everything goes to stderr so stdout stays free for
/// the invocation response.
pub struct FetchTUI {
    bar: Option<ProgressBar>,
    stored: usize,
    skipped: usize,
}

impl FetchTUI {
    pub fn new() -> Self {
        Self {
            bar: None,
            stored: 0,
            skipped: 0,
        }
    }

    pub fn start(&mut self, total_pages: u32) -> Result<()> {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} pages")?
                .progress_chars("=> "),
        );
        self.bar = Some(bar);
        Ok(())
    }

    pub fn page_done(&mut self, page: u32, status: &PageStatus) -> Result<()> {
        let (color, line) = match status {
            PageStatus::Stored { key } => {
                self.stored += 1;
                (Color::Green, format!("✓ Page {} stored as {}\n", page, key))
            }
            PageStatus::Skipped { reason } => {
                self.skipped += 1;
                (Color::Red, format!("✗ Page {} skipped ({})\n", page, reason))
            }
        };

        match &self.bar {
            Some(bar) => {
                bar.suspend(|| print_colored(color, &line))?;
                bar.inc(1);
            }
            None => print_colored(color, &line)?,
        }
        Ok(())
    }

    /// Whether a progress bar is currently drawn.
    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    pub fn finish(&mut self, total: usize) -> Result<()> {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let color = if self.stored == 0 { Color::Red } else { Color::White };
        print_colored(
            color,
            &format!(
                "📁 Stored {} of {} pages ({} skipped)\n",
                self.stored, total, self.skipped
            ),
        )?;
        Ok(())
    }
}

impl Default for FetchTUI {
    fn default() -> Self {
        Self::new()
    }
}

fn print_colored(color: Color, text: &str) -> io::Result<()> {
    execute!(
        io::stderr(),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    )
}
