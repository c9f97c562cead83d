/// Which mesh (or all of them) is on screen, and how input moves it
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Single(usize),
}

/// Input that changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Step to the next mesh; after the last one wrap to the first (never back to `All`).
    Advance,
    /// Jump back to `All`.
    Reset,
    /// Jump to one mesh; out-of-range indices are ignored.
    Select(usize),
}

/// Bounded selection state over `mesh_count` meshes.
#[derive(Debug, Clone)]
pub struct SelectionState {
    current: Selection,
    mesh_count: usize,
}

impl SelectionState {
    pub fn new(mesh_count: usize) -> Self {
        Self {
            current: Selection::All,
            mesh_count,
        }
    }

    pub fn current(&self) -> Selection {
        self.current
    }

    /// Numeric form: 0 is `All`, `i + 1` is `Single(i)`.
    pub fn index(&self) -> usize {
        match self.current {
            Selection::All => 0,
            Selection::Single(i) => i + 1,
        }
    }

    pub fn apply(&mut self, trigger: Trigger) -> Selection {
        if self.mesh_count == 0 {
            return self.current;
        }
        self.current = match (trigger, self.current) {
            (Trigger::Reset, _) => Selection::All,
            (Trigger::Select(i), _) if i < self.mesh_count => Selection::Single(i),
            (Trigger::Select(_), current) => current,
            (Trigger::Advance, Selection::All) => Selection::Single(0),
            (Trigger::Advance, Selection::Single(i)) => {
                Selection::Single((i + 1) % self.mesh_count)
            }
        };
        self.current
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::Single(i) => write!(f, "#{}", i + 1),
        }
    }
}
