use std::io::{self, Write, stdout};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture,
    },
    execute, queue,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};

use super::{Color, Font};

/// A screen-space rectangle in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect script coordinates (possibly negative or huge) with `self`.
    pub fn clip(&self, x: i64, y: i64, w: i64, h: i64) -> Option<Rect> {
        let x0 = x.max(self.x as i64);
        let y0 = y.max(self.y as i64);
        let x1 = (x.saturating_add(w)).min(self.x as i64 + self.width as i64);
        let y1 = (y.saturating_add(h)).min(self.y as i64 + self.height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(
            x0 as u16,
            y0 as u16,
            (x1 - x0) as u16,
            (y1 - y0) as u16,
        ))
    }

    fn right(&self) -> u16 {
        self.x + self.width
    }
}

/// Immediate-mode drawing surface on a terminal (or any writer)
///
/// Cell backgrounds are remembered so text drawn over a rectangle keeps the
/// rectangle's color.
pub struct Canvas {
    out: Box<dyn Write>,
    width: u16,
    height: u16,
    clip: Rect,
    backgrounds: Vec<Color>,
    is_terminal: bool,
}

impl Canvas {
    /// Canvas on stdout, sized to the terminal
    pub fn terminal() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mut canvas = Self::with_writer(stdout(), width, height);
        canvas.is_terminal = true;
        Ok(canvas)
    }

    /// Canvas on an arbitrary writer with a fixed size
    pub fn with_writer(out: impl Write + 'static, width: u16, height: u16) -> Self {
        Self {
            out: Box::new(out),
            width,
            height,
            clip: Rect::new(0, 0, width, height),
            backgrounds: vec![Color::default(); width as usize * height as usize],
            is_terminal: false,
        }
    }

    pub fn setup() -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            EnableBracketedPaste,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    pub fn teardown() -> io::Result<()> {
        execute!(
            stdout(),
            DisableBracketedPaste,
            DisableFocusChange,
            DisableMouseCapture,
            Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.clip = Rect::new(0, 0, width, height);
        self.backgrounds = vec![Color::default(); width as usize * height as usize];
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.is_terminal {
            execute!(self.out, SetTitle(title))?;
        }
        Ok(())
    }

    pub fn begin_frame(&mut self) -> io::Result<()> {
        if self.is_terminal {
            let (w, h) = terminal::size()?;
            self.resize(w, h);
        }
        self.clip = Rect::new(0, 0, self.width, self.height);
        // Hide cursor during redraw to prevent flicker
        queue!(self.out, Hide)?;
        Ok(())
    }

    pub fn end_frame(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip
    }

    pub fn set_clip_rect(&mut self, x: i64, y: i64, w: i64, h: i64) {
        let screen = Rect::new(0, 0, self.width, self.height);
        self.clip = screen.clip(x, y, w, h).unwrap_or(Rect::new(0, 0, 0, 0));
    }

    /// Fill a rectangle; returns the area actually painted after clipping.
    pub fn draw_rect(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        color: Color,
    ) -> io::Result<Option<Rect>> {
        if color.is_transparent() {
            return Ok(None);
        }
        let Some(area) = self.clip.clip(x, y, w, h) else {
            return Ok(None);
        };

        queue!(self.out, SetBackgroundColor(color.to_crossterm()))?;
        let blank = " ".repeat(area.width as usize);
        for row in area.y..area.y + area.height {
            queue!(self.out, MoveTo(area.x, row), Print(&blank))?;
            let start = row as usize * self.width as usize + area.x as usize;
            self.backgrounds[start..start + area.width as usize].fill(color);
        }
        Ok(Some(area))
    }

    /// Draw one line of text; returns the x coordinate just past it.
    pub fn draw_text(
        &mut self,
        font: &Font,
        text: &str,
        x: i64,
        y: i64,
        color: Color,
    ) -> io::Result<i64> {
        let end = x + font.width(text);
        if color.is_transparent() || y < self.clip.y as i64 {
            return Ok(end);
        }
        if y >= self.clip.y as i64 + self.clip.height as i64 {
            return Ok(end);
        }
        let row = y as u16;

        queue!(self.out, SetForegroundColor(color.to_crossterm()))?;
        let mut col = x;
        let mut current_bg: Option<Color> = None;
        for ch in text.chars() {
            let cells = font.width(ch.encode_utf8(&mut [0; 4]));
            let glyph = if ch == '\t' { ' ' } else { ch };
            for _ in 0..cells {
                if col >= self.clip.x as i64 && col < self.clip.right() as i64 {
                    let cell = row as usize * self.width as usize + col as usize;
                    let bg = self.backgrounds[cell];
                    if current_bg != Some(bg) {
                        queue!(self.out, SetBackgroundColor(bg.to_crossterm()))?;
                        current_bg = Some(bg);
                    }
                    queue!(self.out, MoveTo(col as u16, row), Print(glyph))?;
                }
                col += 1;
            }
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Writer whose contents stay inspectable after the canvas takes it
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn canvas() -> (Canvas, Shared) {
        let out = Shared::default();
        (Canvas::with_writer(out.clone(), 80, 24), out)
    }

    #[test]
    fn rect_clipped_to_screen() {
        let (mut c, _) = canvas();
        let painted = c.draw_rect(-5, -5, 10, 10, Color::WHITE).unwrap();
        assert_eq!(painted, Some(Rect::new(0, 0, 5, 5)));

        let painted = c.draw_rect(75, 20, 100, 100, Color::WHITE).unwrap();
        assert_eq!(painted, Some(Rect::new(75, 20, 5, 4)));
    }

    #[test]
    fn rect_clipped_to_clip_rect() {
        let (mut c, _) = canvas();
        c.begin_frame().unwrap();
        c.set_clip_rect(10, 10, 5, 5);
        let painted = c.draw_rect(0, 0, 12, 12, Color::WHITE).unwrap();
        assert_eq!(painted, Some(Rect::new(10, 10, 2, 2)));
        assert_eq!(c.draw_rect(0, 0, 5, 5, Color::WHITE).unwrap(), None);

        // A new frame resets the clip
        c.begin_frame().unwrap();
        assert_eq!(c.clip_rect(), Rect::new(0, 0, 80, 24));
    }

    #[test]
    fn transparent_draws_nothing() {
        let (mut c, out) = canvas();
        let painted = c.draw_rect(0, 0, 5, 5, Color::rgba(1, 2, 3, 0)).unwrap();
        assert_eq!(painted, None);
        assert!(out.0.borrow().is_empty());
    }

    #[test]
    fn text_returns_end_x_and_writes_glyphs() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let font = Font::load(file.path(), 12.0).unwrap();
        let (mut c, out) = canvas();

        let end = c.draw_text(&font, "hey", 2, 1, Color::WHITE).unwrap();
        c.end_frame().unwrap();
        assert_eq!(end, 5);

        let written = String::from_utf8_lossy(&out.0.borrow()).to_string();
        assert!(written.contains('h'));
        assert!(written.contains('y'));
    }

    #[test]
    fn text_outside_clip_is_skipped() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let font = Font::load(file.path(), 12.0).unwrap();
        let (mut c, out) = canvas();
        c.set_clip_rect(0, 0, 10, 1);

        let end = c.draw_text(&font, "zzz", 0, 5, Color::WHITE).unwrap();
        assert_eq!(end, 3);
        assert!(!String::from_utf8_lossy(&out.0.borrow()).contains('z'));
    }

    #[test]
    fn resize_resets_clip() {
        let (mut c, _) = canvas();
        c.set_clip_rect(1, 1, 2, 2);
        c.resize(100, 30);
        assert_eq!(c.size(), (100, 30));
        assert_eq!(c.clip_rect(), Rect::new(0, 0, 100, 30));
    }
}
