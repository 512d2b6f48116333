use crate::api::Food;

/// Whether the "add a dish" surface is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateSession {
    open: bool,
}

impl CreateSession {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// The "edit a dish" surface: whether it is open and which dish it targets.
///
/// The selection is a snapshot of the dish taken when editing began. It is cleared whenever the
/// surface closes, so reopening never shows a previous selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    open: bool,
    selected: Option<Food>,
}

impl EditSession {
    /// Select `food` for editing and open the surface, replacing any previous selection
    pub fn begin_edit(&mut self, food: Food) {
        if let Some(previous) = self.selected.replace(food) {
            log::debug!("Edit of food {} superseded", previous.id);
        }
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.selected = None;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open = true;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<&Food> {
        self.selected.as_ref()
    }
}
