// Copyright (c) 2026 softveil

use crate::cell::Cell;

/// One cell grid worth of output. The field repaints it from scratch every
/// tick; the terminal layer diffs it against what is already on screen.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    blank: Cell,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<crossterm::style::Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(self.blank);
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_clear_restores_blank() {
        let mut f = Frame::new(3, 2, None);
        f.set(
            2,
            1,
            Cell {
                ch: '▀',
                fg: None,
                bg: None,
            },
        );
        assert_eq!(f.get(2, 1).unwrap().ch, '▀');
        f.clear();
        assert_eq!(f.get(2, 1).unwrap().ch, ' ');
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut f = Frame::new(3, 2, None);
        f.set(
            3,
            0,
            Cell {
                ch: 'x',
                fg: None,
                bg: None,
            },
        );
        assert!(f.get(3, 0).is_none());
        assert!(f.cells.iter().all(|c| c.ch == ' '));
    }
}
