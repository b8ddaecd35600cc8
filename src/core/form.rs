/// Saveability of the task form. The title is the only field that matters;
/// due date, notes, and category are all optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormValidity {
    /// Title is blank (empty or whitespace only).
    Empty,
    Valid,
}

impl FormValidity {
    pub fn of_title(title: &str) -> Self {
        if title.trim().is_empty() {
            Self::Empty
        } else {
            Self::Valid
        }
    }

    pub fn can_save(self) -> bool {
        matches!(self, Self::Valid)
    }
}
