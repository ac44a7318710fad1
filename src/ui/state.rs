/// Selection and scroll cursors for the two panes.
///
/// `body_scroll` goes back to 0 whenever `selected` changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selected: usize,
    pub sidebar_top: usize,
    pub body_scroll: usize,
}

impl ViewState {
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.body_scroll = 0;
        }
    }

    pub fn select_next(&mut self, item_count: usize) {
        if self.selected + 1 < item_count {
            self.selected += 1;
            self.body_scroll = 0;
        }
    }

    pub fn clamp_selection(&mut self, item_count: usize) {
        let last = item_count.saturating_sub(1);
        if self.selected > last {
            self.selected = last;
            self.body_scroll = 0;
        }
    }

    /// Scrolls the sidebar so that `selected` is one of `visible_rows` rows.
    pub fn keep_visible(&mut self, visible_rows: usize) {
        let visible_rows = visible_rows.max(1);
        if self.selected < self.sidebar_top {
            self.sidebar_top = self.selected;
        }
        if self.selected >= self.sidebar_top + visible_rows {
            self.sidebar_top = self.selected + 1 - visible_rows;
        }
    }

    pub fn page_down(&mut self, reader_height: u16) {
        self.body_scroll += page_step(reader_height);
    }

    pub fn page_up(&mut self, reader_height: u16) {
        self.body_scroll = self.body_scroll.saturating_sub(page_step(reader_height));
    }

    pub fn scroll_to_top(&mut self) {
        self.body_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self, max_scroll: usize) {
        self.body_scroll = max_scroll;
    }

    pub fn clamp_body_scroll(&mut self, max_scroll: usize) {
        self.body_scroll = self.body_scroll.min(max_scroll);
    }

    /// After the working set is replaced: keep the index in range and show
    /// the top of the body. `sidebar_top` is fixed up on the next frame.
    pub fn after_refresh(&mut self, item_count: usize) {
        self.clamp_selection(item_count);
        self.body_scroll = 0;
    }
}

fn page_step(reader_height: u16) -> usize {
    usize::from(reader_height / 2).max(1)
}
