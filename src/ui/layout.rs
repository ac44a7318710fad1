use ratatui::prelude::Rect;

pub const MIN_WIDTH: u16 = 68;
/// Borders, padding and the title/meta/separator rows leave one body row.
pub const MIN_HEIGHT: u16 = 9;
pub const SIDEBAR_MIN: u16 = 24;
pub const SIDEBAR_FRACTION: f32 = 0.33;
const GUTTER: u16 = 1;
const FOOTER_ROWS: u16 = 1;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "terminal too small: {width}x{height} (need at least {}x{})",
    MIN_WIDTH,
    MIN_HEIGHT
)]
pub struct LayoutError {
    pub width: u16,
    pub height: u16,
}

/// Pane sizes for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub sidebar_width: u16,
    pub reader_width: u16,
    pub sidebar_height: u16,
    pub reader_height: u16,
}

/// Splits a `height` x `width` terminal into sidebar, gutter, reader and footer.
pub fn plan(height: u16, width: u16) -> Result<Geometry, LayoutError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(LayoutError { width, height });
    }
    let proportional = (f32::from(width) * SIDEBAR_FRACTION).round() as u16;
    let sidebar_width = SIDEBAR_MIN.max(proportional);
    let reader_width = width - sidebar_width - GUTTER;
    let pane_height = height - FOOTER_ROWS;
    Ok(Geometry {
        sidebar_width,
        reader_width,
        sidebar_height: pane_height,
        reader_height: pane_height,
    })
}

impl Geometry {
    pub fn sidebar_rect(&self) -> Rect {
        Rect::new(0, 0, self.sidebar_width, self.sidebar_height)
    }

    pub fn reader_rect(&self) -> Rect {
        Rect::new(
            self.sidebar_width + GUTTER,
            0,
            self.reader_width,
            self.reader_height,
        )
    }

    pub fn footer_rect(&self) -> Rect {
        Rect::new(
            0,
            self.sidebar_height,
            self.sidebar_width + GUTTER + self.reader_width,
            FOOTER_ROWS,
        )
    }

    /// Item rows inside the sidebar border.
    pub fn sidebar_rows(&self) -> usize {
        usize::from(self.sidebar_height.saturating_sub(2))
    }
}
